//! The physical side of resource accounting.

use colony_types::{Position, ResourceKind};

/// Access to resource items lying at world positions.
///
/// Implemented by the simulation world. The ledger only ever touches
/// storage positions the colony hands it.
pub trait ItemStore {
    /// Number of items at `pos` counting as `kind`.
    fn count_resource(&self, pos: Position, kind: ResourceKind) -> u32;

    /// Remove up to `count` items counting as `kind` from `pos`.
    /// Returns how many were removed.
    fn remove_resource(&mut self, pos: Position, kind: ResourceKind, count: u32) -> u32;

    /// Create `count` items counting as `kind` at `pos`.
    fn drop_resource(&mut self, pos: Position, kind: ResourceKind, count: u32);
}

/// Minimal in-memory [`ItemStore`] keyed by position and kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    piles: std::collections::BTreeMap<(Position, ResourceKind), u32>,
}

impl MemoryStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            piles: std::collections::BTreeMap::new(),
        }
    }
}

impl ItemStore for MemoryStore {
    fn count_resource(&self, pos: Position, kind: ResourceKind) -> u32 {
        self.piles.get(&(pos, kind)).copied().unwrap_or(0)
    }

    fn remove_resource(&mut self, pos: Position, kind: ResourceKind, count: u32) -> u32 {
        let Some(pile) = self.piles.get_mut(&(pos, kind)) else {
            return 0;
        };
        let removed = count.min(*pile);
        *pile = pile.saturating_sub(removed);
        if *pile == 0 {
            self.piles.remove(&(pos, kind));
        }
        removed
    }

    fn drop_resource(&mut self, pos: Position, kind: ResourceKind, count: u32) {
        if count > 0 {
            let pile = self.piles.entry((pos, kind)).or_insert(0);
            *pile = pile.saturating_add(count);
        }
    }
}
