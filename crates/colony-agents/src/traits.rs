//! Trait sets and the status projection.
//!
//! A member's traits are a fixed-size bitset indexed by
//! [`MinionTrait::index`]. Status flags are never stored on their own:
//! [`project_status`] derives them from traits plus two body facts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use colony_types::{CreatureStatus, MinionTrait};

/// A set of [`MinionTrait`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitSet(u16);

impl TraitSet {
    /// No traits.
    pub const EMPTY: Self = Self(0);

    const fn bit(t: MinionTrait) -> u16 {
        1_u16 << t.index()
    }

    /// Build from a slice.
    pub fn of(traits: &[MinionTrait]) -> Self {
        traits.iter().fold(Self::EMPTY, |acc, t| acc.with(*t))
    }

    /// Copy with `t` added.
    #[must_use]
    pub const fn with(self, t: MinionTrait) -> Self {
        Self(self.0 | Self::bit(t))
    }

    /// Copy with `t` removed.
    #[must_use]
    pub const fn without(self, t: MinionTrait) -> Self {
        Self(self.0 & !Self::bit(t))
    }

    /// Whether `t` is present.
    pub const fn contains(self, t: MinionTrait) -> bool {
        self.0 & Self::bit(t) != 0
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Present traits in declaration order.
    pub fn iter(self) -> impl Iterator<Item = MinionTrait> {
        MinionTrait::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<MinionTrait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = MinionTrait>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Status flags of one creature.
pub type StatusSet = BTreeSet<CreatureStatus>;

/// Derive status flags.
///
/// A civilian is a humanoid member that is conscious and neither fighter
/// nor leader. Non-members carry no flags.
pub fn project_status(traits: TraitSet, member: bool, humanoid: bool, stunned: bool) -> StatusSet {
    let mut status = StatusSet::new();
    if !member {
        return status;
    }
    let fighter = traits.contains(MinionTrait::Fighter);
    let leader = traits.contains(MinionTrait::Leader);
    if humanoid && !stunned && !fighter && !leader {
        status.insert(CreatureStatus::Civilian);
    }
    if fighter {
        status.insert(CreatureStatus::Fighter);
    }
    if leader {
        status.insert(CreatureStatus::Leader);
    }
    if traits.contains(MinionTrait::Prisoner) {
        status.insert(CreatureStatus::Prisoner);
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitset_insert_remove() {
        let set = TraitSet::of(&[MinionTrait::Fighter, MinionTrait::Leader]);
        assert!(set.contains(MinionTrait::Leader));
        let set = set.without(MinionTrait::Leader);
        assert!(!set.contains(MinionTrait::Leader));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![MinionTrait::Fighter]);
        assert!(set.without(MinionTrait::Fighter).is_empty());
    }

    #[test]
    fn civilian_requires_conscious_humanoid_non_fighter() {
        let worker = TraitSet::of(&[MinionTrait::Worker]);
        assert!(project_status(worker, true, true, false).contains(&CreatureStatus::Civilian));
        assert!(project_status(worker, true, true, true).is_empty());
        assert!(project_status(worker, true, false, false).is_empty());
        let fighter = TraitSet::of(&[MinionTrait::Fighter]);
        let status = project_status(fighter, true, true, false);
        assert_eq!(status.into_iter().collect::<Vec<_>>(), vec![CreatureStatus::Fighter]);
    }

    #[test]
    fn non_members_carry_no_status() {
        let set = TraitSet::of(&[MinionTrait::Prisoner, MinionTrait::Fighter]);
        assert!(project_status(set, false, true, false).is_empty());
    }
}
