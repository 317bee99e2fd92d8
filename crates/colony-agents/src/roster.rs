//! Colony membership: the population manager.
//!
//! # Design
//!
//! - **Enum-indexed trait lists**: `by_trait` is an array with one list per
//!   [`MinionTrait`], kept in join order. Membership tests go through the
//!   per-member [`TraitSet`].
//! - **Status is a projection**: every trait change recomputes the member's
//!   status from its traits through [`project_status`]. Nothing writes the
//!   status map directly.
//! - **Population groups**: each member starts in its own group; groups
//!   that arrived together can be merged. The population size counts
//!   groups, minus members that do not count towards the limit.
//! - The roster does not touch tasks or resources. The colony frees tasks
//!   and refunds costs around [`Roster::remove`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use colony_types::{
    AgentId, CreatureStatus, LastingEffect, MinionActivity, MinionTrait, PopulationStats,
};

use crate::activity::CurrentActivity;
use crate::error::AgentError;
use crate::service::AgentService;
use crate::traits::{StatusSet, TraitSet, project_status};

/// Lock group name for prisoners, regardless of species.
pub const PRISONER_GROUP: &str = "prisoner";

/// Members of one colony and their per-member bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    members: Vec<AgentId>,
    traits: BTreeMap<AgentId, TraitSet>,
    by_trait: [Vec<AgentId>; MinionTrait::COUNT],
    status: BTreeMap<AgentId, StatusSet>,
    species: BTreeMap<AgentId, String>,
    population_groups: Vec<Vec<AgentId>>,
    activities: BTreeMap<AgentId, CurrentActivity>,
    locks: BTreeMap<AgentId, BTreeSet<MinionActivity>>,
    group_locks: BTreeMap<String, BTreeSet<MinionActivity>>,
    banished: BTreeSet<AgentId>,
    had_leader: bool,
}

impl Roster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    // -- membership ---------------------------------------------------------

    /// Add `agent` with `traits`.
    ///
    /// # Errors
    ///
    /// [`AgentError::AlreadyMember`] if the agent is a member already.
    pub fn add<A: AgentService + ?Sized>(
        &mut self,
        agent: AgentId,
        traits: TraitSet,
        service: &A,
    ) -> Result<(), AgentError> {
        if self.traits.contains_key(&agent) {
            return Err(AgentError::AlreadyMember(agent));
        }
        self.members.push(agent);
        self.population_groups.push(vec![agent]);
        self.traits.insert(agent, traits);
        self.species.insert(agent, service.species(agent));
        for t in traits.iter() {
            if let Some(list) = self.by_trait.get_mut(t.index()) {
                list.push(agent);
            }
        }
        if traits.contains(MinionTrait::Leader) {
            self.had_leader = true;
        }
        self.activities.insert(agent, CurrentActivity::idle());
        self.refresh_status(agent, service);
        info!(agent = %agent, name = service.name(agent), ?traits, "member joined");
        Ok(())
    }

    /// Remove `agent` and strip all its traits. Returns `false` if it was
    /// not a member.
    pub fn remove(&mut self, agent: AgentId) -> bool {
        if self.traits.remove(&agent).is_none() {
            return false;
        }
        self.members.retain(|a| *a != agent);
        for group in &mut self.population_groups {
            group.retain(|a| *a != agent);
        }
        self.population_groups.retain(|g| !g.is_empty());
        for list in &mut self.by_trait {
            list.retain(|a| *a != agent);
        }
        self.status.remove(&agent);
        self.species.remove(&agent);
        self.activities.remove(&agent);
        self.locks.remove(&agent);
        info!(agent = %agent, "member removed");
        true
    }

    /// Whether `agent` is a member.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.traits.contains_key(&agent)
    }

    /// Members in join order.
    pub fn members(&self) -> &[AgentId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the colony has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Record a banishment.
    pub fn mark_banished(&mut self, agent: AgentId) {
        self.banished.insert(agent);
    }

    /// Whether `agent` was banished.
    pub fn was_banished(&self, agent: AgentId) -> bool {
        self.banished.contains(&agent)
    }

    /// Whether the colony ever had a leader.
    pub const fn had_leader(&self) -> bool {
        self.had_leader
    }

    // -- traits -------------------------------------------------------------

    /// Traits of `agent`; empty for non-members.
    pub fn traits_of(&self, agent: AgentId) -> TraitSet {
        self.traits.get(&agent).copied().unwrap_or_default()
    }

    /// Whether `agent` holds `t`.
    pub fn has_trait(&self, agent: AgentId, t: MinionTrait) -> bool {
        self.traits_of(agent).contains(t)
    }

    /// Members holding `t`, in the order they gained it.
    pub fn with_trait(&self, t: MinionTrait) -> &[AgentId] {
        self.by_trait
            .get(t.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Leaders, in order.
    pub fn leaders(&self) -> &[AgentId] {
        self.with_trait(MinionTrait::Leader)
    }

    /// Add `t` to a member. Returns `false` if it was present.
    ///
    /// # Errors
    ///
    /// [`AgentError::NotMember`] for non-members.
    pub fn add_trait<A: AgentService + ?Sized>(
        &mut self,
        agent: AgentId,
        t: MinionTrait,
        service: &A,
    ) -> Result<bool, AgentError> {
        let current = *self.traits.get(&agent).ok_or(AgentError::NotMember(agent))?;
        if current.contains(t) {
            return Ok(false);
        }
        self.traits.insert(agent, current.with(t));
        if let Some(list) = self.by_trait.get_mut(t.index()) {
            list.push(agent);
        }
        if t == MinionTrait::Leader {
            self.had_leader = true;
        }
        self.refresh_status(agent, service);
        debug!(agent = %agent, ?t, "trait added");
        Ok(true)
    }

    /// Remove `t` from a member. Returns `false` if it was absent.
    ///
    /// # Errors
    ///
    /// [`AgentError::NotMember`] for non-members.
    pub fn remove_trait<A: AgentService + ?Sized>(
        &mut self,
        agent: AgentId,
        t: MinionTrait,
        service: &A,
    ) -> Result<bool, AgentError> {
        let current = *self.traits.get(&agent).ok_or(AgentError::NotMember(agent))?;
        if !current.contains(t) {
            return Ok(false);
        }
        self.traits.insert(agent, current.without(t));
        if let Some(list) = self.by_trait.get_mut(t.index()) {
            list.retain(|a| *a != agent);
        }
        self.refresh_status(agent, service);
        debug!(agent = %agent, ?t, "trait removed");
        Ok(true)
    }

    /// Recompute the status of `agent` from its traits and body.
    pub fn refresh_status<A: AgentService + ?Sized>(&mut self, agent: AgentId, service: &A) {
        let member = self.contains(agent);
        let status = project_status(
            self.traits_of(agent),
            member,
            service.is_humanoid(agent),
            service.has_effect(agent, LastingEffect::Stunned),
        );
        if member {
            self.status.insert(agent, status);
        } else {
            self.status.remove(&agent);
        }
    }

    /// Status of `agent`; empty for non-members.
    pub fn status_of(&self, agent: AgentId) -> StatusSet {
        self.status.get(&agent).cloned().unwrap_or_default()
    }

    /// Whether `agent` carries `status`.
    pub fn has_status(&self, agent: AgentId, status: CreatureStatus) -> bool {
        self.status.get(&agent).is_some_and(|s| s.contains(&status))
    }

    // -- groups and locks ---------------------------------------------------

    /// Lock group of a member: prisoners share one group, everyone else is
    /// grouped by species.
    pub fn group_name(&self, agent: AgentId) -> String {
        if self.has_trait(agent, MinionTrait::Prisoner) {
            PRISONER_GROUP.to_owned()
        } else {
            self.species.get(&agent).cloned().unwrap_or_default()
        }
    }

    /// Merge `agents` into one population group. Singleton groups of the
    /// listed agents are dissolved.
    pub fn set_population_group(&mut self, agents: &[AgentId]) {
        self.population_groups
            .retain(|g| !(g.len() == 1 && g.first().is_some_and(|a| agents.contains(a))));
        let group: Vec<AgentId> = agents.iter().copied().filter(|a| self.contains(*a)).collect();
        if !group.is_empty() {
            self.population_groups.push(group);
        }
    }

    /// Whether `activity` is locked for `agent` personally.
    pub fn is_locked(&self, agent: AgentId, activity: MinionActivity) -> bool {
        self.locks.get(&agent).is_some_and(|l| l.contains(&activity))
    }

    /// Flip a personal lock. Returns the new state.
    pub fn toggle_lock(&mut self, agent: AgentId, activity: MinionActivity) -> bool {
        let locks = self.locks.entry(agent).or_default();
        if locks.remove(&activity) {
            false
        } else {
            locks.insert(activity);
            true
        }
    }

    /// Whether `activity` is locked for the group of `agent`.
    pub fn is_group_locked(&self, agent: AgentId, activity: MinionActivity) -> bool {
        self.group_locks
            .get(&self.group_name(agent))
            .is_some_and(|l| l.contains(&activity))
    }

    /// Flip the group locks of `agent`'s group for every activity in
    /// `activities`.
    pub fn toggle_group_locks(&mut self, agent: AgentId, activities: &[MinionActivity]) {
        let group = self.group_name(agent);
        let locks = self.group_locks.entry(group).or_default();
        for activity in activities {
            if !locks.remove(activity) {
                locks.insert(*activity);
            }
        }
    }

    // -- activities ---------------------------------------------------------

    /// Current activity of `agent`; idle for unknown agents.
    pub fn current_activity(&self, agent: AgentId) -> CurrentActivity {
        self.activities.get(&agent).copied().unwrap_or_default()
    }

    /// Replace the activity of a member. Returns `false` when the activity
    /// did not change.
    ///
    /// # Errors
    ///
    /// [`AgentError::NotMember`] for non-members.
    pub fn set_activity(
        &mut self,
        agent: AgentId,
        activity: MinionActivity,
        now: u64,
    ) -> Result<bool, AgentError> {
        let slot = self
            .activities
            .get_mut(&agent)
            .ok_or(AgentError::NotMember(agent))?;
        if slot.activity == activity {
            return Ok(false);
        }
        *slot = CurrentActivity::starting(activity, now);
        Ok(true)
    }

    /// Members whose activity is `activity`.
    pub fn doing(&self, activity: MinionActivity) -> Vec<AgentId> {
        self.members
            .iter()
            .filter(|a| self.current_activity(**a).activity == activity)
            .copied()
            .collect()
    }

    // -- population ---------------------------------------------------------

    /// Population size: groups, minus members that do not count.
    pub fn population_size(&self) -> u32 {
        let groups = u32::try_from(self.population_groups.len()).unwrap_or(u32::MAX);
        let free = u32::try_from(self.with_trait(MinionTrait::NoLimit).len()).unwrap_or(u32::MAX);
        groups.saturating_sub(free)
    }

    /// Counts for read-only views.
    pub fn stats(&self, max_population: u32) -> PopulationStats {
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let civilians = self
            .status
            .values()
            .filter(|s| s.contains(&CreatureStatus::Civilian))
            .count();
        PopulationStats {
            members: count(self.members.len()),
            population: self.population_size(),
            max_population,
            fighters: count(self.with_trait(MinionTrait::Fighter).len()),
            workers: count(self.with_trait(MinionTrait::Worker).len()),
            prisoners: count(self.with_trait(MinionTrait::Prisoner).len()),
            leaders: count(self.leaders().len()),
            civilians: count(civilians),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{ColonyId, ExperienceKind, ItemId, Position, TribeId};

    use super::*;

    /// Every agent is a humanoid goblin; stunned agents are listed.
    #[derive(Default)]
    struct Bodies {
        stunned: BTreeSet<AgentId>,
    }

    impl AgentService for Bodies {
        fn exists(&self, _: AgentId) -> bool {
            true
        }
        fn name(&self, _: AgentId) -> String {
            "goblin".to_owned()
        }
        fn species(&self, _: AgentId) -> String {
            "goblin".to_owned()
        }
        fn is_humanoid(&self, _: AgentId) -> bool {
            true
        }
        fn morale(&self, _: AgentId) -> f64 {
            0.0
        }
        fn add_morale(&mut self, _: AgentId, _: f64) {}
        fn can_perform(&self, _: AgentId, _: MinionActivity) -> bool {
            true
        }
        fn has_effect(&self, agent: AgentId, effect: LastingEffect) -> bool {
            effect == LastingEffect::Stunned && self.stunned.contains(&agent)
        }
        fn add_effect(&mut self, _: AgentId, _: LastingEffect, _: Option<u64>) {}
        fn remove_effect(&mut self, _: AgentId, _: LastingEffect) {}
        fn automaton_slots(&self, _: AgentId) -> u32 {
            0
        }
        fn difficulty_points(&self, _: AgentId) -> u32 {
            10
        }
        fn set_controller(&mut self, _: AgentId, _: ColonyId) {}
        fn keeps_controller(&self, _: AgentId) -> bool {
            false
        }
        fn tribe(&self, _: AgentId) -> TribeId {
            TribeId(1)
        }
        fn set_tribe(&mut self, _: AgentId, _: TribeId) {}
        fn remove_private_enemy(&mut self, _: AgentId, _: AgentId) {}
        fn kill(&mut self, _: AgentId, _: Option<AgentId>) {}
        fn increase_experience(&mut self, _: AgentId, _: ExperienceKind, _: f64) {}
        fn equipment(&self, _: AgentId) -> Vec<ItemId> {
            Vec::new()
        }
        fn position(&self, _: AgentId) -> Option<Position> {
            None
        }
    }

    fn assert_projected(roster: &Roster, agent: AgentId, bodies: &Bodies) {
        let expected = project_status(
            roster.traits_of(agent),
            roster.contains(agent),
            true,
            bodies.stunned.contains(&agent),
        );
        assert_eq!(roster.status_of(agent), expected);
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let bodies = Bodies::default();
        let mut r = Roster::new();
        let a = AgentId::new();
        r.add(a, TraitSet::of(&[MinionTrait::Worker]), &bodies).unwrap();
        assert_eq!(
            r.add(a, TraitSet::EMPTY, &bodies),
            Err(AgentError::AlreadyMember(a))
        );
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn status_tracks_every_trait_change() {
        let mut bodies = Bodies::default();
        let mut r = Roster::new();
        let a = AgentId::new();
        r.add(a, TraitSet::of(&[MinionTrait::Fighter, MinionTrait::Leader]), &bodies)
            .unwrap();
        assert_projected(&r, a, &bodies);
        assert!(r.has_status(a, CreatureStatus::Leader));

        bodies.stunned.insert(a);
        r.remove_trait(a, MinionTrait::Fighter, &bodies).unwrap();
        assert_projected(&r, a, &bodies);
        r.remove_trait(a, MinionTrait::Leader, &bodies).unwrap();
        assert_projected(&r, a, &bodies);
        assert!(r.status_of(a).is_empty());

        bodies.stunned.clear();
        r.refresh_status(a, &bodies);
        assert!(r.has_status(a, CreatureStatus::Civilian));
        r.add_trait(a, MinionTrait::Prisoner, &bodies).unwrap();
        assert_projected(&r, a, &bodies);

        r.remove(a);
        assert_projected(&r, a, &bodies);
        assert!(r.with_trait(MinionTrait::Prisoner).is_empty());
    }

    #[test]
    fn population_excludes_no_limit_members() {
        let bodies = Bodies::default();
        let mut r = Roster::new();
        let a = AgentId::new();
        let b = AgentId::new();
        let c = AgentId::new();
        r.add(a, TraitSet::of(&[MinionTrait::Worker]), &bodies).unwrap();
        r.add(b, TraitSet::of(&[MinionTrait::Worker]), &bodies).unwrap();
        r.add(c, TraitSet::of(&[MinionTrait::Prisoner, MinionTrait::NoLimit]), &bodies)
            .unwrap();
        assert_eq!(r.population_size(), 2);
        r.set_population_group(&[a, b]);
        assert_eq!(r.population_size(), 1);
        r.remove(a);
        assert_eq!(r.population_size(), 1);
        let stats = r.stats(5);
        assert_eq!(stats.members, 2);
        assert_eq!(stats.prisoners, 1);
    }

    #[test]
    fn prisoners_share_a_lock_group() {
        let bodies = Bodies::default();
        let mut r = Roster::new();
        let a = AgentId::new();
        let b = AgentId::new();
        r.add(a, TraitSet::of(&[MinionTrait::Prisoner]), &bodies).unwrap();
        r.add(b, TraitSet::of(&[MinionTrait::Worker]), &bodies).unwrap();
        assert_eq!(r.group_name(a), PRISONER_GROUP);
        assert_eq!(r.group_name(b), "goblin");
        r.toggle_group_locks(a, &[MinionActivity::Working]);
        assert!(r.is_group_locked(a, MinionActivity::Working));
        assert!(!r.is_group_locked(b, MinionActivity::Working));
        r.toggle_group_locks(a, &[MinionActivity::Working]);
        assert!(!r.is_group_locked(a, MinionActivity::Working));
    }

    #[test]
    fn set_activity_reports_changes() {
        let bodies = Bodies::default();
        let mut r = Roster::new();
        let a = AgentId::new();
        r.add(a, TraitSet::EMPTY, &bodies).unwrap();
        assert!(!r.set_activity(a, MinionActivity::Idle, 0).unwrap());
        assert!(r.set_activity(a, MinionActivity::Sleep, 0).unwrap());
        assert_eq!(r.doing(MinionActivity::Sleep), vec![a]);
        assert!(r.set_activity(AgentId::new(), MinionActivity::Sleep, 0).is_err());
    }
}
