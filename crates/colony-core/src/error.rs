//! Errors raised by colony operations.
//!
//! Contract violations from the sub-crates are wrapped with `#[from]` so
//! that colony code can propagate them with `?`. Everything that is
//! steady-state policy (no storage, nothing to do) is not an error.

use colony_types::{AgentId, FurnitureKind, ItemId, Position, StorageKind};

/// Errors that abort a colony operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColonyError {
    /// A ledger contract was violated.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: colony_ledger::LedgerError,
    },

    /// A construction registry contract was violated.
    #[error("site error: {source}")]
    Site {
        /// The underlying site error.
        #[from]
        source: colony_site::SiteError,
    },

    /// A task queue contract was violated.
    #[error("task error: {source}")]
    Task {
        /// The underlying task error.
        #[from]
        source: colony_tasks::TaskError,
    },

    /// A membership contract was violated.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: colony_agents::AgentError,
    },

    /// The operation needs storage of this kind and the colony has none.
    #[error("no {storage:?} storage")]
    NoStorage {
        /// Missing storage kind.
        storage: StorageKind,
    },

    /// An item expected in the world is gone.
    #[error("item {0} not found")]
    MissingItem(ItemId),

    /// The item is not offered for sale.
    #[error("item {0} is not for sale")]
    NotForSale(ItemId),

    /// Not enough gold to buy an item.
    #[error("item costs {price} gold, only {budget} available")]
    TooExpensive {
        /// Price of the item.
        price: i64,
        /// Gold owned by the buyer.
        budget: i64,
    },

    /// No immigration offer at this index.
    #[error("no immigration offer at index {0}")]
    UnknownOffer(usize),

    /// Furniture cannot be planned here.
    #[error("cannot plan {kind:?} at {pos}")]
    CannotBuild {
        /// Position.
        pos: Position,
        /// Requested furniture.
        kind: FurnitureKind,
    },

    /// Nothing destructible at this position.
    #[error("nothing to destroy at {pos}")]
    NothingToDestroy {
        /// Position.
        pos: Position,
    },

    /// The agent is not a member of this colony.
    #[error("agent {0} is not a member")]
    NotMember(AgentId),

    /// Pillaging needs the victim to be conquered first.
    #[error("colony {0} is not conquered")]
    NotConquered(String),

    /// A colony cannot act on itself.
    #[error("a colony cannot trade with, pillage or absorb itself")]
    SameColony,
}
