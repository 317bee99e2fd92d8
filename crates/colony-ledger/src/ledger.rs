//! The colony's resource ledger.
//!
//! A resource can exist in two places at once: as an abstract credit
//! counter, and as physical items sitting on the colony's storage
//! positions. [`ResourceLedger`] owns the credit side and reads the
//! physical side through an [`ItemStore`].
//!
//! # Design
//!
//! - **Take prefers credit**: credit is drained before any item is removed.
//! - **Return prefers items**: item-backed kinds are dropped on a random
//!   storage position when one exists; only otherwise do they become
//!   credit.
//! - **Preconditions before mutation**: a negative cost or an unaffordable
//!   take is rejected with a [`LedgerError`] and nothing changes.
//! - **Audit**: every movement is appended to an [`AuditLog`].

use std::collections::BTreeMap;

use tracing::debug;

use colony_types::{CostInfo, Dice, Position, ResourceKind};

use crate::LedgerError;
use crate::audit::{AuditLog, Bucket, Direction, Movement};
use crate::catalog::ResourceCatalog;
use crate::store::ItemStore;

// ---------------------------------------------------------------------------
// Debt
// ---------------------------------------------------------------------------

/// The parts of a resource kind's debt, gathered by the colony from the
/// subsystems that reserve resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Debt {
    /// Costs of planned but unbuilt constructions.
    pub constructions: i64,
    /// Costs already taken for tasks that are not yet done.
    pub funded_tasks: i64,
    /// Costs of queued, unfunded workshop items.
    pub workshops: i64,
}

impl Debt {
    /// Outstanding obligations not yet covered by a take.
    pub const fn total(&self) -> i64 {
        self.constructions
            .saturating_sub(self.funded_tasks)
            .saturating_add(self.workshops)
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Credit counters plus the rules for moving resources in and out.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    catalog: ResourceCatalog,
    credit: BTreeMap<ResourceKind, i64>,
    audit: AuditLog,
}

impl ResourceLedger {
    /// Create an empty ledger over `catalog`.
    pub const fn new(catalog: ResourceCatalog) -> Self {
        Self {
            catalog,
            credit: BTreeMap::new(),
            audit: AuditLog::new(),
        }
    }

    /// The resource catalog.
    pub const fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    /// The movement log.
    pub const fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Current credit for `kind`.
    pub fn credit(&self, kind: ResourceKind) -> i64 {
        self.credit.get(&kind).copied().unwrap_or(0)
    }

    /// Add to the credit bucket directly (starting resources, rewards).
    pub fn add_credit(&mut self, kind: ResourceKind, amount: i64) {
        let slot = self.credit.entry(kind).or_insert(0);
        *slot = slot.saturating_add(amount);
    }

    /// Physical units of `kind` on `storage`.
    pub fn stored<S: ItemStore + ?Sized>(
        &self,
        kind: ResourceKind,
        storage: &[Position],
        store: &S,
    ) -> i64 {
        if self.catalog.storage_of(kind).is_none() {
            return 0;
        }
        storage
            .iter()
            .map(|pos| i64::from(store.count_resource(*pos, kind)))
            .fold(0_i64, i64::saturating_add)
    }

    /// Credit plus physical units of `kind` on `storage`.
    pub fn num_resource<S: ItemStore + ?Sized>(
        &self,
        kind: ResourceKind,
        storage: &[Position],
        store: &S,
    ) -> i64 {
        self.credit(kind)
            .saturating_add(self.stored(kind, storage, store))
    }

    /// Whether the colony owns at least `cost.value` of `cost.kind`.
    pub fn has_resource<S: ItemStore + ?Sized>(
        &self,
        cost: &CostInfo,
        storage: &[Position],
        store: &S,
    ) -> bool {
        self.num_resource(cost.kind, storage, store) >= cost.value
    }

    /// Remove `cost` from the colony, credit first, then storage items in
    /// the order given.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NegativeCost`] for a negative value,
    /// [`LedgerError::Insufficient`] when the colony does not own enough,
    /// and [`LedgerError::MissingItems`] when the store held fewer items
    /// than it reported.
    pub fn take_resource<S: ItemStore + ?Sized>(
        &mut self,
        cost: &CostInfo,
        storage: &[Position],
        store: &mut S,
        tick: u64,
    ) -> Result<(), LedgerError> {
        check_value(cost)?;
        if cost.value == 0 {
            return Ok(());
        }
        let available = self.num_resource(cost.kind, storage, store);
        if available < cost.value {
            return Err(LedgerError::Insufficient {
                kind: cost.kind,
                requested: cost.value,
                available,
            });
        }

        let mut remaining = cost.value;
        let credit = self.credit(cost.kind);
        if credit > 0 {
            let from_credit = credit.min(remaining);
            self.credit.insert(cost.kind, credit.saturating_sub(from_credit));
            remaining = remaining.saturating_sub(from_credit);
            self.audit.record(Movement {
                tick,
                kind: cost.kind,
                amount: from_credit,
                bucket: Bucket::Credit,
                direction: Direction::Take,
            });
        }

        let mut from_storage = 0_i64;
        for pos in storage {
            if remaining == 0 {
                break;
            }
            let want = u32::try_from(remaining).unwrap_or(u32::MAX);
            let removed = i64::from(store.remove_resource(*pos, cost.kind, want));
            remaining = remaining.saturating_sub(removed);
            from_storage = from_storage.saturating_add(removed);
        }
        self.audit.record(Movement {
            tick,
            kind: cost.kind,
            amount: from_storage,
            bucket: Bucket::Storage,
            direction: Direction::Take,
        });

        debug!(
            kind = ?cost.kind,
            value = cost.value,
            from_storage,
            "resource taken"
        );
        if remaining > 0 {
            return Err(LedgerError::MissingItems {
                kind: cost.kind,
                missing: remaining,
            });
        }
        Ok(())
    }

    /// Give `cost` back to the colony.
    ///
    /// Item-backed kinds are dropped on a storage position chosen by
    /// `dice` when `storage` is non-empty; everything else becomes credit.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NegativeCost`] for a negative value.
    pub fn return_resource<S: ItemStore + ?Sized, D: Dice + ?Sized>(
        &mut self,
        cost: &CostInfo,
        storage: &[Position],
        store: &mut S,
        dice: &mut D,
        tick: u64,
    ) -> Result<(), LedgerError> {
        check_value(cost)?;
        if cost.value == 0 {
            return Ok(());
        }
        let physical = self
            .catalog
            .info(cost.kind)
            .is_some_and(|info| info.storage.is_some() && info.item_backed);
        if physical {
            let target = dice
                .choose_index(storage.len())
                .and_then(|i| storage.get(i).copied());
            if let Some(pos) = target {
                let count = u32::try_from(cost.value).unwrap_or(u32::MAX);
                store.drop_resource(pos, cost.kind, count);
                self.audit.record(Movement {
                    tick,
                    kind: cost.kind,
                    amount: i64::from(count),
                    bucket: Bucket::Storage,
                    direction: Direction::Return,
                });
                debug!(kind = ?cost.kind, value = cost.value, %pos, "resource returned to storage");
                return Ok(());
            }
        }
        self.add_credit(cost.kind, cost.value);
        self.audit.record(Movement {
            tick,
            kind: cost.kind,
            amount: cost.value,
            bucket: Bucket::Credit,
            direction: Direction::Return,
        });
        debug!(kind = ?cost.kind, value = cost.value, "resource returned to credit");
        Ok(())
    }
}

const fn check_value(cost: &CostInfo) -> Result<(), LedgerError> {
    if cost.value < 0 {
        return Err(LedgerError::NegativeCost {
            kind: cost.kind,
            value: cost.value,
        });
    }
    Ok(())
}
