//! Append-only record of resource movements through the ledger.
//!
//! Every successful take or return appends one [`Movement`] per bucket it
//! touched. Summing the signed amounts for a kind gives the net flow the
//! ledger caused, which lets tests check that a take followed by a return
//! restores the total.

use serde::{Deserialize, Serialize};

use colony_types::ResourceKind;

/// Where a movement landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bucket {
    /// The abstract credit counter.
    Credit,
    /// Physical items in storage.
    Storage,
}

/// Direction of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Resources left the colony.
    Take,
    /// Resources came back to the colony.
    Return,
}

/// One recorded movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Local time of the movement.
    pub tick: u64,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Strictly positive amount.
    pub amount: i64,
    /// Bucket touched.
    pub bucket: Bucket,
    /// Take or return.
    pub direction: Direction,
}

impl Movement {
    /// Amount signed by direction (returns positive, takes negative).
    pub const fn signed(&self) -> i64 {
        match self.direction {
            Direction::Take => self.amount.saturating_neg(),
            Direction::Return => self.amount,
        }
    }
}

/// The append-only log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLog {
    entries: Vec<Movement>,
}

impl AuditLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a movement. Zero amounts are not recorded.
    pub fn record(&mut self, movement: Movement) {
        if movement.amount != 0 {
            self.entries.push(movement);
        }
    }

    /// All movements in insertion order.
    pub fn entries(&self) -> &[Movement] {
        &self.entries
    }

    /// Number of movements.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no movement was recorded.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Net signed flow for `kind` across all movements.
    pub fn net_flow(&self, kind: ResourceKind) -> i64 {
        self.entries
            .iter()
            .filter(|m| m.kind == kind)
            .fold(0_i64, |acc, m| acc.saturating_add(m.signed()))
    }

    /// Net signed flow for `kind` in one bucket.
    pub fn net_flow_in(&self, kind: ResourceKind, bucket: Bucket) -> i64 {
        self.entries
            .iter()
            .filter(|m| m.kind == kind && m.bucket == bucket)
            .fold(0_i64, |acc, m| acc.saturating_add(m.signed()))
    }
}
