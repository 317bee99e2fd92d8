//! Which member owns which piece of equipment.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use colony_types::{AgentId, ItemId};

/// Item ownership and per-owner locks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentOwnership {
    owner: BTreeMap<ItemId, AgentId>,
    owned: BTreeMap<AgentId, BTreeSet<ItemId>>,
    locked: BTreeSet<(AgentId, ItemId)>,
}

impl EquipmentOwnership {
    /// Empty table.
    pub const fn new() -> Self {
        Self {
            owner: BTreeMap::new(),
            owned: BTreeMap::new(),
            locked: BTreeSet::new(),
        }
    }

    /// Record `agent` as owner of `item`. Fails if someone else owns it.
    pub fn try_to_own(&mut self, agent: AgentId, item: ItemId) -> bool {
        match self.owner.get(&item) {
            Some(current) => *current == agent,
            None => {
                self.owner.insert(item, agent);
                self.owned.entry(agent).or_default().insert(item);
                true
            }
        }
    }

    /// Forget the owner of `item`.
    pub fn discard(&mut self, item: ItemId) {
        if let Some(agent) = self.owner.remove(&item) {
            if let Some(items) = self.owned.get_mut(&agent) {
                items.remove(&item);
                if items.is_empty() {
                    self.owned.remove(&agent);
                }
            }
            self.locked.remove(&(agent, item));
        }
    }

    /// Owner of `item`.
    pub fn owner(&self, item: ItemId) -> Option<AgentId> {
        self.owner.get(&item).copied()
    }

    /// Items owned by `agent`.
    pub fn owned_by(&self, agent: AgentId) -> Vec<ItemId> {
        self.owned
            .get(&agent)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drop every item owned by `agent`. Returns the freed items.
    pub fn remove_owner(&mut self, agent: AgentId) -> Vec<ItemId> {
        let items = self.owned_by(agent);
        for item in &items {
            self.discard(*item);
        }
        items
    }

    /// Drop owners for which `keep` is false. Returns the freed items.
    pub fn update_owners(&mut self, keep: impl Fn(AgentId) -> bool) -> Vec<ItemId> {
        let gone: Vec<AgentId> = self.owned.keys().copied().filter(|a| !keep(*a)).collect();
        let freed: Vec<ItemId> = gone
            .into_iter()
            .flat_map(|agent| self.remove_owner(agent))
            .collect();
        if !freed.is_empty() {
            debug!(freed = freed.len(), "equipment owners updated");
        }
        freed
    }

    /// Flip the lock of `item` for `agent`. Returns the new state.
    pub fn toggle_locked(&mut self, agent: AgentId, item: ItemId) -> bool {
        if self.locked.remove(&(agent, item)) {
            false
        } else {
            self.locked.insert((agent, item));
            true
        }
    }

    /// Whether `agent` locked `item`.
    pub fn is_locked(&self, agent: AgentId, item: ItemId) -> bool {
        self.locked.contains(&(agent, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_is_exclusive() {
        let mut e = EquipmentOwnership::new();
        let (a, b, item) = (AgentId::new(), AgentId::new(), ItemId::new());
        assert!(e.try_to_own(a, item));
        assert!(e.try_to_own(a, item));
        assert!(!e.try_to_own(b, item));
        assert_eq!(e.owner(item), Some(a));
    }

    #[test]
    fn update_owners_frees_items_of_departed() {
        let mut e = EquipmentOwnership::new();
        let (a, b) = (AgentId::new(), AgentId::new());
        let (x, y) = (ItemId::new(), ItemId::new());
        e.try_to_own(a, x);
        e.try_to_own(b, y);
        assert!(e.toggle_locked(a, x));
        let freed = e.update_owners(|agent| agent == b);
        assert_eq!(freed, vec![x]);
        assert_eq!(e.owner(x), None);
        assert!(!e.is_locked(a, x));
        assert_eq!(e.owned_by(b), vec![y]);
    }
}
