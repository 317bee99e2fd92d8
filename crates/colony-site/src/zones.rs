//! Zone tags over positions.
//!
//! A position may carry any number of zone tags; each tag is an
//! independent set so that membership is a single lookup.

use std::collections::{BTreeMap, BTreeSet};

use colony_types::{Position, ZoneKind};

use crate::territory::Territory;

static EMPTY: BTreeSet<Position> = BTreeSet::new();

/// Zone tags of one colony.
#[derive(Debug, Clone, Default)]
pub struct Zones {
    by_kind: BTreeMap<ZoneKind, BTreeSet<Position>>,
}

impl Zones {
    /// Create with no tags.
    pub const fn new() -> Self {
        Self {
            by_kind: BTreeMap::new(),
        }
    }

    /// Tag `pos` with `kind`.
    pub fn set_zone(&mut self, pos: Position, kind: ZoneKind) {
        self.by_kind.entry(kind).or_default().insert(pos);
    }

    /// Remove the `kind` tag from `pos`.
    pub fn erase_zone(&mut self, pos: Position, kind: ZoneKind) {
        if let Some(set) = self.by_kind.get_mut(&kind) {
            set.remove(&pos);
        }
    }

    /// Whether `pos` carries `kind`.
    pub fn is_zone(&self, pos: Position, kind: ZoneKind) -> bool {
        self.by_kind.get(&kind).is_some_and(|s| s.contains(&pos))
    }

    /// All positions tagged `kind`.
    pub fn positions(&self, kind: ZoneKind) -> &BTreeSet<Position> {
        self.by_kind.get(&kind).unwrap_or(&EMPTY)
    }

    /// Tags removed when the square's middle layer is ordered destroyed.
    pub fn on_destroy_order(&mut self, pos: Position) {
        for kind in [
            ZoneKind::StorageResources,
            ZoneKind::StorageEquipment,
            ZoneKind::Guard,
            ZoneKind::Leisure,
        ] {
            self.erase_zone(pos, kind);
        }
    }

    /// Drop guard posts and leisure tags on squares the colony no longer
    /// holds. Returns the number of tags removed.
    pub fn tick(&mut self, territory: &Territory) -> usize {
        let mut removed = 0_usize;
        for kind in [ZoneKind::Guard, ZoneKind::Leisure] {
            if let Some(set) = self.by_kind.get_mut(&kind) {
                let before = set.len();
                set.retain(|pos| territory.contains(*pos));
                removed = removed.saturating_add(before.saturating_sub(set.len()));
            }
        }
        removed
    }
}
