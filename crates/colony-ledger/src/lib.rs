//! Resource accounting for a colony.
//!
//! Resources live either as abstract credit or as physical items on the
//! colony's storage positions. The ledger reconciles both views, enforces
//! the take/return rules and keeps an audit trail.
//!
//! # Architecture
//!
//! - [`catalog`] -- Which kinds are physical and where they are stored.
//! - [`store`] -- The [`ItemStore`] trait over world items, plus an
//!   in-memory implementation.
//! - [`ledger`] -- The [`ResourceLedger`] and [`Debt`] breakdown.
//! - [`audit`] -- The append-only movement log.
//!
//! The ledger never panics; it returns errors.

pub mod audit;
pub mod catalog;
pub mod ledger;
pub mod store;

pub use audit::{AuditLog, Bucket, Direction, Movement};
pub use catalog::{ResourceCatalog, ResourceInfo};
pub use ledger::{Debt, ResourceLedger};
pub use store::{ItemStore, MemoryStore};

use colony_types::ResourceKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Contract violations detected by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A cost value below zero.
    #[error("negative cost {value} for {kind:?}")]
    NegativeCost {
        /// Resource kind.
        kind: ResourceKind,
        /// The invalid value.
        value: i64,
    },

    /// A take larger than what the colony owns.
    #[error("cannot take {requested} {kind:?}, only {available} available")]
    Insufficient {
        /// Resource kind.
        kind: ResourceKind,
        /// Requested amount.
        requested: i64,
        /// Credit plus stored items at the time of the call.
        available: i64,
    },

    /// Storage reported items that could not be removed.
    #[error("storage is missing {missing} {kind:?}")]
    MissingItems {
        /// Resource kind.
        kind: ResourceKind,
        /// Units that could not be removed.
        missing: i64,
    },
}
