//! Spatial bookkeeping for a colony.
//!
//! # Modules
//!
//! - [`territory`] -- Claimed squares and their border.
//! - [`known`] -- Discovered squares.
//! - [`zones`] -- Zone tags (storage, guard posts, fetch areas).
//! - [`furniture`] -- The static furniture catalog.
//! - [`construction`] -- Planned and built furniture, and trap plans.

pub mod construction;
pub mod furniture;
pub mod known;
pub mod territory;
pub mod zones;

pub use construction::{ConstructionRegistry, FurniturePlan, PlanState, TrapPlan};
pub use furniture::{FurnitureCatalog, FurnitureInfo, FurnitureUsage};
pub use known::KnownTiles;
pub use territory::Territory;
pub use zones::Zones;

use colony_types::{FurnitureLayer, Position};

/// Errors raised by the construction registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteError {
    /// A plan already exists at this position and layer.
    #[error("furniture already planned at {pos} ({layer:?})")]
    DuplicatePlan {
        /// Position.
        pos: Position,
        /// Layer.
        layer: FurnitureLayer,
    },

    /// No plan exists at this position and layer.
    #[error("no furniture planned at {pos} ({layer:?})")]
    UnknownPlan {
        /// Position.
        pos: Position,
        /// Layer.
        layer: FurnitureLayer,
    },

    /// The plan is already built.
    #[error("furniture at {pos} ({layer:?}) is already built")]
    AlreadyBuilt {
        /// Position.
        pos: Position,
        /// Layer.
        layer: FurnitureLayer,
    },

    /// A trap plan already exists at this position.
    #[error("trap already planned at {pos}")]
    DuplicateTrap {
        /// Position.
        pos: Position,
    },
}
