//! Joining, leaving and the per-member state the colony derives from its
//! roster: traits, activities, locks and eligibility.

use tracing::{debug, info};

use colony_agents::{
    AgentService, Candidate, Situation, TaskSource, TraitSet, is_eligible, task_source,
};
use colony_types::{
    AgentId, CostInfo, LastingEffect, MessagePriority, MinionActivity, MinionTrait,
    PlayerMessage, SunlightState,
};
use colony_tasks::TaskAction;

use crate::control::Notice;
use crate::error::ColonyError;
use crate::world::{Env, World};

use super::Colony;

impl Colony {
    /// Add `agent` as a member with `traits`.
    ///
    /// Leaders gain the fighter trait when the colony is configured so,
    /// and summoned creatures join outside the population limit. An agent
    /// already standing in the world is seeded as rested and satiated. It
    /// is taken under the colony's control unless it is livestock or keeps
    /// its own controller, then moved to the colony's tribe and cleared of
    /// grudges against the existing members.
    ///
    /// Leaving a previous colony is the caller's business; inside a
    /// [`Simulation`](crate::Simulation) the next step takes care of it.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Agent`] if the agent is a member already.
    pub fn add_member(
        &mut self,
        agent: AgentId,
        traits: TraitSet,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        if self.roster.contains(agent) {
            return Err(colony_agents::AgentError::AlreadyMember(agent).into());
        }
        let mut traits = if self.config.leader_is_fighter && traits.contains(MinionTrait::Leader) {
            traits.with(MinionTrait::Fighter)
        } else {
            traits
        };
        let world = &mut *env.world;
        if world.exists(agent) {
            let until = env.now.saturating_add(self.config.timing.rested_duration);
            world.add_effect(agent, LastingEffect::Rested, Some(until));
            world.add_effect(agent, LastingEffect::Satiated, Some(until));
        }
        if world.has_effect(agent, LastingEffect::Summoned) {
            traits = traits.with(MinionTrait::NoLimit).with(MinionTrait::Summoned);
        }
        if !traits.contains(MinionTrait::FarmAnimal) && !world.keeps_controller(agent) {
            world.set_controller(agent, self.id);
        }
        if world.tribe(agent) != self.tribe {
            world.set_tribe(agent, self.tribe);
        }
        for other in self.roster.members() {
            world.remove_private_enemy(agent, *other);
            world.remove_private_enemy(*other, agent);
        }
        self.roster.add(agent, traits, &*world)?;
        self.notices.push(Notice::MemberAdded { agent });
        Ok(())
    }

    /// Whether `agent` carries and owns equipment.
    pub fn uses_equipment(&self, agent: AgentId, world: &dyn World) -> bool {
        self.roster.contains(agent)
            && world.is_humanoid(agent)
            && !self.roster.has_trait(agent, MinionTrait::Prisoner)
            && !self.roster.has_trait(agent, MinionTrait::NoEquipment)
    }

    /// Remove `agent`, freeing its task (with refund) and its equipment.
    /// Returns `false` for non-members.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] if the refund fails.
    pub fn remove_member(&mut self, agent: AgentId, env: &mut Env<'_>) -> Result<bool, ColonyError> {
        if !self.roster.contains(agent) {
            return Ok(false);
        }
        self.free_from_task(agent, env)?;
        self.equipment.remove_owner(agent);
        Ok(self.roster.remove(agent))
    }

    /// Detach `agent` from its task and refund whatever the task had
    /// reserved. Returns the refunded cost; zero when there was no task.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] if the refund fails.
    pub fn free_from_task(
        &mut self,
        agent: AgentId,
        env: &mut Env<'_>,
    ) -> Result<CostInfo, ColonyError> {
        let cost = self.tasks.free_from_task(agent);
        if !cost.is_free() {
            debug!(agent = %agent, kind = ?cost.kind, value = cost.value, "task cost refunded");
        }
        self.refund(cost, env)?;
        Ok(cost)
    }

    /// Expel a member. Automatons are disassembled instead.
    ///
    /// # Errors
    ///
    /// [`ColonyError::NotMember`] for non-members.
    pub fn banish(&mut self, agent: AgentId, env: &mut Env<'_>) -> Result<(), ColonyError> {
        if !self.roster.contains(agent) {
            return Err(ColonyError::NotMember(agent));
        }
        if self.roster.has_trait(agent, MinionTrait::Automaton) {
            if let Some(pos) = env.world.position(agent) {
                if !self.tasks.has_task_at(pos, MinionActivity::Craft) {
                    self.tasks
                        .add_task(TaskAction::Disassemble { agent }, pos, MinionActivity::Craft);
                }
            }
            return Ok(());
        }
        let name = env.world.name(agent);
        let delta = -self.config.morale.banish;
        self.shift_fighter_morale(delta, &mut *env.world, Some(agent));
        self.roster.mark_banished(agent);
        self.remove_member(agent, env)?;
        info!(colony = %self.id, agent = %agent, %name, "member banished");
        self.message(
            PlayerMessage::new(format!("{name} is banished.")).with_priority(MessagePriority::High),
        );
        Ok(())
    }

    // -- traits -------------------------------------------------------------

    /// Give a member a trait. Returns `false` if it already had it.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Agent`] for non-members.
    pub fn add_trait(
        &mut self,
        agent: AgentId,
        t: MinionTrait,
        world: &dyn World,
    ) -> Result<bool, ColonyError> {
        Ok(self.roster.add_trait(agent, t, world)?)
    }

    /// Take a trait from a member. Returns `false` if it did not have it.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Agent`] for non-members.
    pub fn remove_trait(
        &mut self,
        agent: AgentId,
        t: MinionTrait,
        world: &dyn World,
    ) -> Result<bool, ColonyError> {
        Ok(self.roster.remove_trait(agent, t, world)?)
    }

    // -- activities ---------------------------------------------------------

    /// Switch a member to `activity`, dropping the task of the old one.
    /// Returns `false` when the activity did not change.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Agent`] for non-members.
    pub fn set_minion_activity(
        &mut self,
        agent: AgentId,
        activity: MinionActivity,
        env: &mut Env<'_>,
    ) -> Result<bool, ColonyError> {
        let changed = self.roster.set_activity(agent, activity, env.now)?;
        if changed {
            self.free_from_task(agent, env)?;
            debug!(agent = %agent, ?activity, "activity set");
        }
        Ok(changed)
    }

    /// Flip a personal activity lock. Returns the new state.
    pub fn toggle_activity_lock(&mut self, agent: AgentId, activity: MinionActivity) -> bool {
        self.roster.toggle_lock(agent, activity)
    }

    /// Flip the group locks of `agent`'s group.
    pub fn toggle_group_locks(&mut self, agent: AgentId, activities: &[MinionActivity]) {
        self.roster.toggle_group_locks(agent, activities);
    }

    fn situation(&self, sunlight: SunlightState) -> Situation {
        Situation {
            sunlight,
            villain_sleeping: self.config.villain_sleeping,
            population: self.roster.population_size(),
            max_population: self.max_population(),
        }
    }

    fn candidate(&self, agent: AgentId, activity: MinionActivity, world: &dyn World) -> Candidate {
        Candidate {
            capable: world.can_perform(agent, activity),
            locked: self.roster.is_locked(agent, activity),
            group_locked: self.roster.is_group_locked(agent, activity),
            morale: world.morale(agent),
        }
    }

    /// Whether a task for `activity` can be generated right now.
    fn generatable(&self, activity: MinionActivity) -> bool {
        match task_source(activity) {
            TaskSource::Always => true,
            TaskSource::Furniture => self
                .furniture
                .for_activity(activity)
                .into_iter()
                .any(|kind| self.constructions.built_count(kind) > 0),
            TaskSource::Queue => false,
        }
    }

    /// Whether `agent` may take up `activity` now.
    pub fn is_activity_good(
        &self,
        agent: AgentId,
        activity: MinionActivity,
        ignore_locks: bool,
        env: &Env<'_>,
    ) -> bool {
        if !self.roster.contains(agent) {
            return false;
        }
        let world: &dyn World = &*env.world;
        is_eligible(
            activity,
            &self.candidate(agent, activity, world),
            &self.situation(env.sunlight),
            ignore_locks,
            self.generatable(activity),
            self.tasks.unclaimed_count(activity) > 0,
        )
    }

    /// Reset members whose activity ran out, or who no longer qualify for
    /// it and hold no task, to idle. Returns how many were reset.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] if refunding a dropped task fails.
    pub fn update_activities(&mut self, env: &mut Env<'_>) -> Result<usize, ColonyError> {
        let stale: Vec<AgentId> = self
            .roster
            .members()
            .iter()
            .copied()
            .filter(|agent| {
                let current = self.roster.current_activity(*agent);
                if current.activity == MinionActivity::Idle {
                    return false;
                }
                current.is_expired(env.now)
                    || (!self.tasks.has_task(*agent)
                        && !self.is_activity_good(*agent, current.activity, false, env))
            })
            .collect();
        for agent in &stale {
            self.set_minion_activity(*agent, MinionActivity::Idle, env)?;
        }
        Ok(stale.len())
    }

    /// Add `delta` to the morale of every fighter except `except`.
    pub(super) fn shift_fighter_morale(
        &self,
        delta: f64,
        world: &mut dyn World,
        except: Option<AgentId>,
    ) {
        for fighter in self.roster.with_trait(MinionTrait::Fighter) {
            if Some(*fighter) != except {
                world.add_morale(*fighter, delta);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{CreatureStatus, Position, TribeId};

    use crate::config::ColonyConfig;
    use crate::dice::ScriptedDice;
    use crate::sandbox::{Body, SandboxWorld};

    use super::*;

    const HOME: Position = Position::new(0, 3, 3);

    fn setup() -> (SandboxWorld, Colony) {
        (
            SandboxWorld::new(10, 10),
            Colony::new(TribeId(1), ColonyConfig::default()),
        )
    }

    #[test]
    fn joining_seeds_effects_and_allegiance() {
        let (mut world, mut colony) = setup();
        let orc = world.spawn(Body::new("orc", "orc").humanoid().at(HOME).tribe(TribeId(7)));
        let old = world.spawn(Body::new("imp", "imp").at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 10, SunlightState::Day);
        colony.add_member(old, TraitSet::of(&[MinionTrait::Worker]), &mut env).unwrap();
        colony
            .add_member(orc, TraitSet::of(&[MinionTrait::Leader]), &mut env)
            .unwrap();
        assert!(env.world.has_effect(orc, LastingEffect::Rested));
        assert!(env.world.has_effect(orc, LastingEffect::Satiated));
        assert_eq!(env.world.tribe(orc), TribeId(1));
        // Leaders fight by default.
        assert!(colony.roster().has_trait(orc, MinionTrait::Fighter));
        assert!(colony.roster().has_status(orc, CreatureStatus::Leader));
        assert!(matches!(
            colony.drain_notices().as_slice(),
            [Notice::MemberAdded { .. }, Notice::MemberAdded { .. }]
        ));
    }

    #[test]
    fn livestock_keeps_no_colony_controller() {
        let (mut world, mut colony) = setup();
        let cow = world.spawn(Body::new("cow", "cow").at(HOME));
        let imp = world.spawn(Body::new("imp", "imp").at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 0, SunlightState::Day);
        colony
            .add_member(cow, TraitSet::of(&[MinionTrait::FarmAnimal]), &mut env)
            .unwrap();
        colony
            .add_member(imp, TraitSet::of(&[MinionTrait::Worker]), &mut env)
            .unwrap();
        assert_eq!(world.body(cow).unwrap().controller, None);
        assert_eq!(world.body(imp).unwrap().controller, Some(colony.id()));
    }

    #[test]
    fn summoned_creatures_join_outside_the_limit() {
        let (mut world, mut colony) = setup();
        let imp = world.spawn(Body::new("imp", "imp").at(HOME));
        let spirit = world.spawn(Body::new("spirit", "spirit").at(HOME));
        world.add_effect(spirit, LastingEffect::Summoned, None);
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 0, SunlightState::Day);
        colony
            .add_member(imp, TraitSet::of(&[MinionTrait::Worker]), &mut env)
            .unwrap();
        colony
            .add_member(spirit, TraitSet::of(&[MinionTrait::Fighter]), &mut env)
            .unwrap();
        assert!(colony.roster().has_trait(spirit, MinionTrait::NoLimit));
        assert!(colony.roster().has_trait(spirit, MinionTrait::Summoned));
        assert!(colony.roster().has_trait(spirit, MinionTrait::Fighter));
        assert!(!colony.roster().has_trait(imp, MinionTrait::NoLimit));
        assert_eq!(colony.roster().population_size(), 1);
    }

    #[test]
    fn duplicate_join_is_an_error() {
        let (mut world, mut colony) = setup();
        let imp = world.spawn(Body::new("imp", "imp").at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 0, SunlightState::Day);
        colony.add_member(imp, TraitSet::EMPTY, &mut env).unwrap();
        assert!(matches!(
            colony.add_member(imp, TraitSet::EMPTY, &mut env),
            Err(ColonyError::Agent { .. })
        ));
    }

    #[test]
    fn removing_a_stranger_is_a_noop() {
        let (mut world, mut colony) = setup();
        let stranger = world.spawn(Body::new("elf", "elf"));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 0, SunlightState::Day);
        assert!(!colony.remove_member(stranger, &mut env).unwrap());
        assert!(matches!(
            colony.banish(stranger, &mut env),
            Err(ColonyError::NotMember(_))
        ));
    }

    #[test]
    fn banishment_lowers_fighter_morale() {
        let (mut world, mut colony) = setup();
        let fighter = world.spawn(Body::new("orc", "orc").humanoid().at(HOME));
        let worker = world.spawn(Body::new("imp", "imp").at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 0, SunlightState::Day);
        colony
            .add_member(fighter, TraitSet::of(&[MinionTrait::Fighter]), &mut env)
            .unwrap();
        colony
            .add_member(worker, TraitSet::of(&[MinionTrait::Worker]), &mut env)
            .unwrap();
        colony.banish(worker, &mut env).unwrap();
        assert!(!colony.roster().contains(worker));
        assert!(colony.roster().was_banished(worker));
        assert!(env.world.morale(fighter) < 0.0);
    }

    #[test]
    fn banished_automaton_gets_disassembled() {
        let (mut world, mut colony) = setup();
        let golem = world.spawn(Body::new("golem", "golem").automaton(2).at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 0, SunlightState::Day);
        colony
            .add_member(golem, TraitSet::of(&[MinionTrait::Automaton]), &mut env)
            .unwrap();
        colony.banish(golem, &mut env).unwrap();
        assert!(colony.roster().contains(golem));
        assert!(colony.tasks().has_task_at(HOME, MinionActivity::Craft));
    }

    #[test]
    fn furniture_activities_need_built_furniture() {
        let (mut world, mut colony) = setup();
        let imp = world.spawn(Body::new("imp", "imp").at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 0, SunlightState::Day);
        colony.add_member(imp, TraitSet::EMPTY, &mut env).unwrap();
        assert!(!colony.is_activity_good(imp, MinionActivity::Train, false, &env));
        assert!(colony.is_activity_good(imp, MinionActivity::Idle, false, &env));
        colony.toggle_activity_lock(imp, MinionActivity::Idle);
        assert!(!colony.is_activity_good(imp, MinionActivity::Idle, false, &env));
        assert!(colony.is_activity_good(imp, MinionActivity::Idle, true, &env));
    }

    #[test]
    fn ineligible_activities_fall_back_to_idle() {
        let (mut world, mut colony) = setup();
        let imp = world.spawn(Body::new("imp", "imp").at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 0, SunlightState::Day);
        colony.add_member(imp, TraitSet::EMPTY, &mut env).unwrap();
        assert!(colony
            .set_minion_activity(imp, MinionActivity::Construction, &mut env)
            .unwrap());
        assert_eq!(colony.update_activities(&mut env).unwrap(), 1);
        assert_eq!(
            colony.roster().current_activity(imp).activity,
            MinionActivity::Idle
        );
    }
}
