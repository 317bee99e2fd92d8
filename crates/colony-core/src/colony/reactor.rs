//! Reactions to game events.
//!
//! Every colony sees every event; each arm decides whether the event
//! concerns this colony (its territory, its members, its traps).

use tracing::{debug, info};

use colony_agents::AgentService;
use colony_types::{
    AgentId, AlarmInfo, CostInfo, LastingEffect, MessagePriority, MinionActivity, MinionTrait,
    PlayerMessage, Position, ResourceKind,
};

use crate::control::Notice;
use crate::error::ColonyError;
use crate::event::GameEvent;
use crate::world::Env;

use super::Colony;

impl Colony {
    /// React to one event.
    ///
    /// # Errors
    ///
    /// Propagates contract violations from the bookkeeping the reaction
    /// triggers (refunds, trait changes).
    pub fn on_event(&mut self, event: &GameEvent, env: &mut Env<'_>) -> Result<(), ColonyError> {
        match event {
            GameEvent::Alarm { pos, silent } => {
                self.on_alarm(*pos, *silent, env);
                Ok(())
            }
            GameEvent::CreatureKilled { victim, attacker } => {
                if self.roster.contains(*victim) {
                    self.on_member_killed(*victim, *attacker, env)?;
                }
                if let Some(killer) = attacker.filter(|k| self.roster.contains(*k)) {
                    self.on_killed_someone(*victim, killer, env);
                }
                Ok(())
            }
            GameEvent::CreatureStunned { victim, attacker } => {
                self.on_stunned(*victim, *attacker, env)
            }
            GameEvent::CreatureTortured { victim, torturer } => {
                self.on_tortured(*victim, *torturer, env)
            }
            GameEvent::TrapTriggered { pos } => {
                if let Some(trap) = self.constructions.trap_mut(*pos) {
                    trap.reset();
                    self.trap_tasks.remove(pos);
                }
                Ok(())
            }
            GameEvent::TrapDisarmed { pos, disarmer } => {
                let Some(trap) = self.constructions.trap_mut(*pos) else {
                    return Ok(());
                };
                let kind = trap.kind;
                trap.reset();
                self.trap_tasks.remove(pos);
                let name = env.world.name(*disarmer);
                self.message(
                    PlayerMessage::new(format!("{name} disarms a {kind:?} trap."))
                        .with_priority(MessagePriority::High)
                        .at(Some(*pos)),
                );
                Ok(())
            }
            GameEvent::FurnitureDestroyed { pos, layer, kind } => {
                if self.constructions.on_furniture_destroyed(*pos, *layer, *kind) {
                    debug!(colony = %self.id, pos = %pos, ?kind, "built furniture lost");
                }
                if let Some(trap) = self.constructions.trap_mut(*pos) {
                    if trap.kind == *kind {
                        trap.reset();
                    }
                }
                Ok(())
            }
            GameEvent::ConqueredEnemy { colony, name } => {
                if *colony != self.id {
                    self.record_event(format!("the conquering of {name}"));
                    self.message(
                        PlayerMessage::new(format!("The tribe of {name} is destroyed."))
                            .with_priority(MessagePriority::Critical),
                    );
                }
                Ok(())
            }
            GameEvent::DangerEscalated { .. } => Ok(()),
        }
    }

    fn on_alarm(&mut self, pos: Position, silent: bool, env: &mut Env<'_>) {
        if !self.territory.contains(pos) {
            return;
        }
        if !silent {
            self.message(
                PlayerMessage::new("An alarm goes off.")
                    .with_priority(MessagePriority::High)
                    .at(Some(pos)),
            );
        }
        self.alarm = Some(AlarmInfo {
            finish_time: env.now.saturating_add(self.config.timing.alarm_duration),
            position: pos,
        });
        for fighter in self.roster.with_trait(MinionTrait::Fighter) {
            if env.world.has_effect(*fighter, LastingEffect::Sleep) {
                env.world.remove_effect(*fighter, LastingEffect::Sleep);
            }
        }
        info!(colony = %self.id, %pos, silent, "alarm raised");
    }

    fn on_member_killed(
        &mut self,
        victim: AgentId,
        killer: Option<AgentId>,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        let name = env.world.name(victim);
        let killer_name = killer.map(|k| env.world.name(k));
        self.record_event(match &killer_name {
            Some(k) => format!("the slaying of {name} by {k}"),
            None => format!("the death of {name}"),
        });
        self.notices.push(Notice::MemberKilled { victim, killer });

        if self.roster.has_trait(victim, MinionTrait::Prisoner)
            && killer.is_some_and(|k| self.roster.contains(k))
        {
            self.return_resource(&CostInfo::new(ResourceKind::PrisonerHead, 1), env)?;
        }

        let mourned = !self.roster.has_trait(victim, MinionTrait::FarmAnimal)
            && !self.roster.has_trait(victim, MinionTrait::Summoned);
        if mourned {
            let only_leader = self.roster.leaders() == [victim];
            let delta = if only_leader {
                -self.config.morale.leader_death
            } else {
                -self.config.morale.death
            };
            self.shift_fighter_morale(delta, &mut *env.world, Some(victim));
            let text = match &killer_name {
                Some(k) => format!("{name} is killed by {k}"),
                None => format!("{name} is killed."),
            };
            let at = env.world.position(victim);
            self.message(
                PlayerMessage::new(text)
                    .with_priority(MessagePriority::High)
                    .at(at),
            );
        }

        let needed = self.needed_for_conquest(victim);
        self.remove_member(victim, env)?;
        info!(colony = %self.id, agent = %victim, %name, "member killed");
        if needed && self.is_conquered() {
            self.announce_conquest(victim, killer);
        }
        Ok(())
    }

    fn on_killed_someone(&mut self, victim: AgentId, killer: AgentId, env: &mut Env<'_>) {
        if env.world.tribe(victim) == self.tribe {
            return;
        }
        env.world.add_morale(killer, self.config.morale.kill);
        self.shift_fighter_morale(self.config.morale.kill_others, &mut *env.world, Some(killer));
        let name = env.world.name(victim);
        let killer_name = env.world.name(killer);
        self.points = self
            .points
            .saturating_add(u64::from(env.world.difficulty_points(victim)));
        self.message(PlayerMessage::new(format!("{name} is killed by {killer_name}")));
        self.kills.push(name);
    }

    fn on_stunned(
        &mut self,
        victim: AgentId,
        attacker: Option<AgentId>,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        let name = env.world.name(victim);
        self.record_event(format!("the capturing of {name}"));
        if self.roster.contains(victim) {
            let was_needed = self.needed_for_conquest(victim);
            self.roster
                .remove_trait(victim, MinionTrait::Fighter, &*env.world)?;
            self.roster
                .remove_trait(victim, MinionTrait::Leader, &*env.world)?;
            let delta = -self.config.morale.death;
            self.shift_fighter_morale(delta, &mut *env.world, Some(victim));
            let at = env.world.position(victim);
            self.message(PlayerMessage::new(format!("{name} is unconscious.")).at(at));
            self.free_from_task(victim, env)?;
            info!(colony = %self.id, agent = %victim, %name, "member captured");
            if was_needed && self.is_conquered() {
                self.announce_conquest(victim, attacker);
            }
        } else if attacker.is_some_and(|a| self.roster.contains(a)) {
            self.immigration.add_captive(victim, env.now);
            debug!(colony = %self.id, agent = %victim, "captive offered");
        }
        Ok(())
    }

    fn on_tortured(
        &mut self,
        victim: AgentId,
        torturer: AgentId,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        if !self.roster.contains(victim) || !env.dice.one_in(self.config.periodic.torture_event) {
            return Ok(());
        }
        let name = env.world.name(victim);
        self.record_event(format!("the torturing of {name}"));
        if env.dice.one_in(2) {
            // The body reports the death; the killed handler removes it.
            env.world.kill(victim, None);
            info!(colony = %self.id, agent = %victim, torturer = %torturer, "prisoner died under torture");
            return Ok(());
        }
        for t in [MinionTrait::Prisoner, MinionTrait::Worker, MinionTrait::NoLimit] {
            self.roster.remove_trait(victim, t, &*env.world)?;
        }
        self.roster
            .add_trait(victim, MinionTrait::Fighter, &*env.world)?;
        env.world.remove_effect(victim, LastingEffect::TiedUp);
        self.set_minion_activity(victim, MinionActivity::Idle, env)?;
        self.free_from_task(victim, env)?;
        info!(colony = %self.id, agent = %victim, %name, "prisoner converted");
        self.message(PlayerMessage::new("A prisoner is converted to your side"));
        Ok(())
    }
}
