//! The fixed per-tick sequence and the periodic passes it runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use colony_agents::AgentService;
use colony_tasks::TaskAction;
use colony_types::{
    AgentId, ColonyId, ItemClass, ItemId, LastingEffect, MessagePriority, MinionActivity,
    MinionTrait, PlayerMessage, PopulationStats, Position, StorageKind, TaskId, TribeId, Warning,
    ZoneKind,
};

use crate::error::ColonyError;
use crate::world::{Env, World};

use super::Colony;

/// Average fighter morale below which [`Warning::LowMorale`] is raised.
const LOW_MORALE: f64 = -0.2;

/// Effects an escaping prisoner shakes off.
const ESCAPE_CLEARS: [LastingEffect; 3] = [
    LastingEffect::Sleep,
    LastingEffect::Entangled,
    LastingEffect::TiedUp,
];

/// What one colony tick did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    /// The tick.
    pub tick: u64,
    /// The colony.
    pub colony: ColonyId,
    /// Population after the tick.
    pub stats: PopulationStats,
    /// Tasks in the queue.
    pub tasks: usize,
    /// Construction and trap tasks created.
    pub funded: usize,
    /// Prisoners that escaped.
    pub escaped: usize,
    /// Danger level.
    pub danger: u32,
    /// Active warnings.
    pub warnings: Vec<Warning>,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl Colony {
    /// Advance the colony by one tick.
    ///
    /// The steps run in this order, each seeing what the earlier ones did:
    ///
    /// 1. Territory border refresh.
    /// 2. Rebellion check.
    /// 3. Guard task reconciliation.
    /// 4. Danger cache invalidation.
    /// 5. Sub-ticks: zones, task sweep, unsupported plans, activity
    ///    reconciliation, stale offers, alarm and delay expiry.
    /// 6. Warnings and the enemy scan (periodic), construction and trap
    ///    sync, workshop funding, fetching and equipment (periodic).
    /// 7. Automaton parts and engines, then the danger escalation check.
    ///
    /// # Errors
    ///
    /// Ledger and registry contract violations from the passes.
    pub fn tick(&mut self, env: &mut Env<'_>) -> Result<TickSummary, ColonyError> {
        self.territory.refresh_border();
        let escaped = self.consider_rebellion(env)?;
        self.update_guard_tasks();
        self.danger = None;

        self.zones.tick(&self.territory);
        self.tasks.tick();
        self.clear_unsupported_plans(env)?;
        self.update_activities(env)?;
        let world: &dyn World = &*env.world;
        self.immigration.prune(|agent| world.exists(agent));
        let now = env.now;
        if self.alarm.is_some_and(|alarm| alarm.finish_time < now) {
            debug!(colony = %self.id, "alarm over");
            self.alarm = None;
        }
        self.delayed.retain(|_, until| *until > now);

        if self.config.warnings && env.dice.one_in(self.config.periodic.warnings) {
            self.update_warnings(&*env.world);
        }
        if self.config.enemy_positions && env.dice.one_in(self.config.periodic.enemy_scan) {
            self.scan_for_enemies(env);
        }
        let mut funded = 0_usize;
        if self.config.constructions {
            funded = self.sync_traps(env);
            funded = funded.saturating_add(self.sync_constructions(env)?);
        }
        self.fund_workshops(env)?;
        if env.dice.one_in(self.config.periodic.fetch) {
            self.fetch_items(env);
        }
        if self.config.manage_equipment && env.dice.one_in(self.config.periodic.equipment) {
            let roster = &self.roster;
            let dropped = self.equipment.update_owners(|agent| roster.contains(agent));
            if !dropped.is_empty() {
                debug!(colony = %self.id, count = dropped.len(), "equipment of former members released");
            }
        }
        self.discard_unusable_equipment(&*env.world);
        self.assign_automaton_parts(env);
        self.update_engines(&mut *env.world);
        self.check_danger(&*env.world);

        let summary = TickSummary {
            tick: now,
            colony: self.id,
            stats: self.population_stats(),
            tasks: self.tasks.len(),
            funded,
            escaped,
            danger: self.danger_level(&*env.world),
            warnings: self.warnings.iter().copied().collect(),
        };
        debug!(
            colony = %self.id,
            tick = now,
            members = summary.stats.members,
            tasks = summary.tasks,
            funded,
            "colony ticked"
        );
        Ok(summary)
    }

    // -- rebellion ----------------------------------------------------------

    /// Probability that the prisoners rise this tick, before the per-tick
    /// divisor.
    ///
    /// Zero while prisoners do not exceed the free allowance. Otherwise the
    /// ratio of excess prisoners to fighters is mapped linearly from the
    /// allowed ratio (0) to the max ratio (1); with no fighters it is 1.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn rebellion_probability(&self) -> f64 {
        let cfg = &self.config.rebellion;
        let prisoners = count(self.roster.with_trait(MinionTrait::Prisoner).len());
        let excess = prisoners.saturating_sub(cfg.free_prisoners);
        if excess == 0 {
            return 0.0;
        }
        let fighters = count(self.roster.with_trait(MinionTrait::Fighter).len());
        if fighters == 0 {
            return 1.0;
        }
        let ratio = f64::from(excess) / f64::from(fighters);
        if cfg.max_ratio <= cfg.allowed_ratio {
            return if ratio > cfg.allowed_ratio { 1.0 } else { 0.0 };
        }
        ((ratio - cfg.allowed_ratio) / (cfg.max_ratio - cfg.allowed_ratio)).clamp(0.0, 1.0)
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn consider_rebellion(&mut self, env: &mut Env<'_>) -> Result<usize, ColonyError> {
        let probability = self.rebellion_probability();
        if probability <= 0.0 {
            return Ok(0);
        }
        let divisor = self.config.rebellion.chance_divisor;
        let divisor = if divisor > 0.0 { divisor } else { 1.0 };
        debug!(colony = %self.id, probability, "rebellion possible");
        if !env.dice.chance(probability / divisor) {
            return Ok(0);
        }
        let prisoners = self.roster.with_trait(MinionTrait::Prisoner).to_vec();
        for agent in &prisoners {
            self.remove_member(*agent, env)?;
            env.world.set_tribe(*agent, TribeId::MONSTER);
            for effect in ESCAPE_CLEARS {
                env.world.remove_effect(*agent, effect);
            }
        }
        info!(colony = %self.id, escaped = prisoners.len(), "prisoners escaped");
        self.message(
            PlayerMessage::new("Prisoners escaping!").with_priority(MessagePriority::Critical),
        );
        Ok(prisoners.len())
    }

    // -- guard posts --------------------------------------------------------

    fn update_guard_tasks(&mut self) {
        let posts: Vec<Position> = self
            .zones
            .positions(ZoneKind::Guard)
            .iter()
            .copied()
            .collect();
        for pos in posts {
            if !self.tasks.has_task_at(pos, MinionActivity::Guarding) {
                self.tasks.add_task(
                    TaskAction::GoToAndWait {
                        duration: self.config.timing.guard_duration,
                    },
                    pos,
                    MinionActivity::Guarding,
                );
            }
        }
        let orphaned: Vec<TaskId> = self
            .tasks
            .tasks_of(MinionActivity::Guarding)
            .into_iter()
            .filter(|id| {
                self.tasks
                    .task(*id)
                    .is_some_and(|t| !self.zones.is_zone(t.position, ZoneKind::Guard))
            })
            .collect();
        for task in orphaned {
            self.tasks.remove_task(task);
        }
    }

    // -- warnings -----------------------------------------------------------

    fn set_warning(&mut self, warning: Warning, active: bool) {
        if active {
            if self.warnings.insert(warning) {
                debug!(colony = %self.id, ?warning, "warning raised");
            }
        } else {
            self.warnings.remove(&warning);
        }
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn average_fighter_morale(&self, world: &dyn World) -> Option<f64> {
        let fighters = self.roster.with_trait(MinionTrait::Fighter);
        if fighters.is_empty() {
            return None;
        }
        let total: f64 = fighters.iter().map(|f| world.morale(*f)).sum();
        Some(total / f64::from(count(fighters.len())))
    }

    fn update_warnings(&mut self, world: &dyn World) {
        let leaderless = self.roster.had_leader() && self.roster.leaders().is_empty();
        self.set_warning(Warning::NoLeader, leaderless);
        let low = self
            .average_fighter_morale(world)
            .is_some_and(|m| m < LOW_MORALE);
        self.set_warning(Warning::LowMorale, low);
        let full = self.roster.population_size() >= self.max_population();
        self.set_warning(Warning::PopulationFull, full);
        let stored: Vec<Warning> = self
            .config
            .fetch_rules
            .iter()
            .filter(|rule| !self.storage_positions(rule.storage).is_empty())
            .filter_map(|rule| rule.warning)
            .collect();
        for warning in stored {
            self.set_warning(warning, false);
        }
    }

    // -- enemies ------------------------------------------------------------

    fn scan_for_enemies(&mut self, env: &Env<'_>) {
        let timing = &self.config.timing;
        let mut area: Vec<Position> = self.territory.all().iter().copied().collect();
        area.extend(self.territory.extended(timing.delay_radius));
        let enemies = env.world.enemy_positions(self.tribe, &area);
        if enemies.is_empty() {
            self.alarm = None;
            return;
        }
        let until = env.now.saturating_add(timing.delay_duration);
        debug!(colony = %self.id, enemies = enemies.len(), until, "tasks near enemies delayed");
        self.delay_dangerous_tasks(&enemies, until);
    }

    // -- workshops ----------------------------------------------------------

    /// Fund the head batch of every workshop whose cost can be covered.
    /// Returns the number of batches funded.
    fn fund_workshops(&mut self, env: &mut Env<'_>) -> Result<usize, ColonyError> {
        let mut funded = 0_usize;
        for kind in self.workshops.kinds() {
            let Some(cost) = self.workshops.get(kind).and_then(|w| w.unfunded_head()) else {
                continue;
            };
            if !self.has_resource(&cost, &*env.world) {
                continue;
            }
            self.take_resource(&cost, env)?;
            if let Some(workshop) = self.workshops.get_mut(kind) {
                workshop.fund_head();
            }
            debug!(colony = %self.id, ?kind, cost = cost.value, "production funded");
            funded = funded.saturating_add(1);
        }
        Ok(funded)
    }

    // -- fetching -----------------------------------------------------------

    /// Haul lying items to the closest storage their rule names: a pickup
    /// task where they lie and a drop task at the storage, both hauling.
    /// Items are marked with the drop task. Returns the number of hauls
    /// queued.
    fn fetch_items(&mut self, env: &Env<'_>) -> usize {
        let now = env.now;
        let mut positions: BTreeSet<Position> = self
            .territory
            .all()
            .iter()
            .copied()
            .filter(|pos| !self.is_delayed(*pos, now))
            .collect();
        for zone in [ZoneKind::FetchItems, ZoneKind::PermanentFetchItems] {
            positions.extend(
                self.zones
                    .positions(zone)
                    .iter()
                    .copied()
                    .filter(|pos| !self.is_delayed(*pos, now)),
            );
        }
        let destinations: Vec<Vec<Position>> = self
            .config
            .fetch_rules
            .iter()
            .map(|rule| self.storage_positions(rule.storage))
            .collect();

        let mut queued = 0_usize;
        for pos in positions {
            if !env.world.can_enter(pos) {
                continue;
            }
            let items = env.world.items_at(pos);
            if items.is_empty() {
                if self.zones.is_zone(pos, ZoneKind::FetchItems) {
                    self.zones.erase_zone(pos, ZoneKind::FetchItems);
                }
                continue;
            }
            let mut groups: BTreeMap<usize, Vec<ItemId>> = BTreeMap::new();
            for item in items.iter().filter(|i| !self.is_item_marked(i.id)) {
                if let Some(rule) = self.config.fetch_rules.iter().position(|r| r.applies(item)) {
                    groups.entry(rule).or_default().push(item.id);
                }
            }
            for (rule, ids) in groups {
                let Some(targets) = destinations.get(rule) else {
                    continue;
                };
                if targets.contains(&pos) {
                    continue;
                }
                let Some(rule) = self.config.fetch_rules.get(rule) else {
                    continue;
                };
                let (storage, warning) = (rule.storage, rule.warning);
                let closest = targets
                    .iter()
                    .filter_map(|t| pos.dist8(*t).map(|d| (d, *t)))
                    .min()
                    .map(|(_, t)| t);
                let Some(dest) = closest else {
                    if let Some(warning) = warning {
                        self.set_warning(warning, true);
                    }
                    continue;
                };
                self.tasks.add_task(
                    TaskAction::PickUp { items: ids.clone() },
                    pos,
                    MinionActivity::Hauling,
                );
                let drop = self.tasks.add_task(
                    TaskAction::Drop {
                        items: ids.clone(),
                        storage,
                    },
                    dest,
                    MinionActivity::Hauling,
                );
                self.mark_items(&ids, drop);
                queued = queued.saturating_add(1);
            }
        }
        if queued > 0 {
            debug!(colony = %self.id, queued, "hauls queued");
        }
        queued
    }

    // -- equipment and automatons -------------------------------------------

    fn discard_unusable_equipment(&mut self, world: &dyn World) {
        let unusable: Vec<AgentId> = self
            .roster
            .members()
            .iter()
            .copied()
            .filter(|a| !self.uses_equipment(*a, world) && world.automaton_slots(*a) == 0)
            .collect();
        for agent in unusable {
            let released = self.equipment.remove_owner(agent);
            if !released.is_empty() {
                debug!(agent = %agent, count = released.len(), "equipment released");
            }
        }
    }

    /// Give unowned parts lying in equipment storage to automatons with
    /// free slots, with a pickup-and-install crafting task each. Returns
    /// the number of parts assigned.
    fn assign_automaton_parts(&mut self, env: &Env<'_>) -> usize {
        let mut parts: Vec<(Position, ItemId)> = self
            .storage_positions(StorageKind::Equipment)
            .into_iter()
            .flat_map(|pos| {
                env.world
                    .items_at(pos)
                    .into_iter()
                    .filter(|i| i.class == ItemClass::AutomatonPart)
                    .map(move |i| (pos, i.id))
            })
            .filter(|(_, id)| self.equipment.owner(*id).is_none() && !self.is_item_marked(*id))
            .collect();
        parts.reverse();
        let automatons = self.roster.with_trait(MinionTrait::Automaton).to_vec();
        let mut assigned = 0_usize;
        for automaton in automatons {
            let pending = count(self.equipment.owned_by(automaton).len());
            let free = env.world.automaton_slots(automaton).saturating_sub(pending);
            for _ in 0..free {
                let Some((pos, part)) = parts.pop() else {
                    return assigned;
                };
                if !self.equipment.try_to_own(automaton, part) {
                    continue;
                }
                let task = self.tasks.add_task(
                    TaskAction::Chain(vec![
                        TaskAction::PickUp { items: vec![part] },
                        TaskAction::InstallPart {
                            agent: automaton,
                            item: part,
                        },
                    ]),
                    pos,
                    MinionActivity::Craft,
                );
                self.mark_items(&[part], task);
                debug!(agent = %automaton, item = %part, "automaton part assigned");
                assigned = assigned.saturating_add(1);
            }
        }
        assigned
    }

    /// Keep the engines of the first automatons within the population
    /// limit running and turn off every automaton after them.
    fn update_engines(&self, world: &mut dyn World) {
        let mut budget = self.max_population();
        for automaton in self.roster.with_trait(MinionTrait::Automaton) {
            let off = world.has_effect(*automaton, LastingEffect::TurnedOff);
            if budget > 0 {
                if off {
                    debug!(agent = %automaton, "engine turned on");
                    world.remove_effect(*automaton, LastingEffect::TurnedOff);
                }
            } else if !off {
                debug!(agent = %automaton, "engine turned off");
                world.add_effect(*automaton, LastingEffect::TurnedOff, None);
            }
            budget = budget.saturating_sub(1);
        }
    }
}
