//! Furniture plans, destruction orders, claimed squares, traps and the
//! passes that turn plans into funded tasks.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, info};

use colony_types::{
    DestroyKind, FurnitureKind, FurnitureLayer, HighlightKind, Item, ItemId, MinionActivity,
    Position, TaskId,
};
use colony_site::FurniturePlan;
use colony_tasks::TaskAction;
use colony_agents::AgentService;

use crate::control::Notice;
use crate::error::ColonyError;
use crate::event::GameEvent;
use crate::world::{Env, World};

use super::Colony;

pub(super) const LAYERS: [FurnitureLayer; 3] = [
    FurnitureLayer::Floor,
    FurnitureLayer::Middle,
    FurnitureLayer::Ceiling,
];

impl Colony {
    // -- furniture plans ----------------------------------------------------

    /// Whether `kind` may be planned at `pos`.
    pub fn can_add_furniture(&self, pos: Position, kind: FurnitureKind, world: &dyn World) -> bool {
        let Some(info) = self.furniture.info(kind) else {
            return false;
        };
        !info.trap
            && self.known.is_known(pos)
            && (self.territory.contains(pos) || info.build_outside_territory)
            && !self.constructions.contains_furniture(pos, info.layer)
            && world.can_construct(pos, kind)
    }

    /// Plan `kind` at `pos`. The cost counts as debt at once; the task is
    /// created by the next construction pass. With `no_credit` the plan is
    /// free. Returns `false` when the furniture cannot be planned there.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Site`] if the registry rejects the plan.
    pub fn add_furniture(
        &mut self,
        pos: Position,
        kind: FurnitureKind,
        no_credit: bool,
        world: &dyn World,
    ) -> Result<bool, ColonyError> {
        if !self.can_add_furniture(pos, kind, world) {
            return Ok(false);
        }
        let layer = self.furniture.layer_of(kind);
        let cost = if no_credit {
            colony_types::CostInfo::free()
        } else {
            self.furniture.cost_of(kind)
        };
        self.constructions
            .add_furniture(pos, layer, FurniturePlan::planned(kind, cost))?;
        debug!(colony = %self.id, %pos, ?kind, cost = cost.value, "furniture planned");
        Ok(true)
    }

    /// Drop an unbuilt plan at `(pos, layer)`, cancelling its task with a
    /// refund. Returns `false` when there is no unbuilt plan.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] if the refund fails.
    pub fn remove_unbuilt_furniture(
        &mut self,
        pos: Position,
        layer: FurnitureLayer,
        env: &mut Env<'_>,
    ) -> Result<bool, ColonyError> {
        let Some(plan) = self.constructions.furniture(pos, layer).copied() else {
            return Ok(false);
        };
        if plan.is_built() {
            return Ok(false);
        }
        self.constructions.remove_furniture_plan(pos, layer);
        if let Some(task) = plan.task() {
            let cost = self.tasks.remove_task(task);
            self.refund(cost, env)?;
        }
        Ok(true)
    }

    // -- destruction orders -------------------------------------------------

    /// Order the middle-layer furniture at `pos` removed (dig a rock, cut a
    /// tree, tear down a built piece). A dig order on an unknown square is
    /// recorded as bogus and dropped once the square becomes known.
    ///
    /// # Errors
    ///
    /// [`ColonyError::NothingToDestroy`] for a known empty square, and
    /// [`ColonyError::Task`] if the square is already marked.
    pub fn order_destruction(&mut self, pos: Position, world: &dyn World) -> Result<TaskId, ColonyError> {
        let (furniture, destroy, bogus) = if self.known.is_known(pos) {
            let kind = world
                .furniture_at(pos, FurnitureLayer::Middle)
                .ok_or(ColonyError::NothingToDestroy { pos })?;
            let destroy = self
                .furniture
                .info(kind)
                .map_or(DestroyKind::Bash, |i| i.destroy);
            (kind, destroy, false)
        } else {
            (FurnitureKind::Rock, DestroyKind::Dig, true)
        };
        let highlight = match destroy {
            DestroyKind::Cut => HighlightKind::CutTree,
            DestroyKind::Dig | DestroyKind::Bash => HighlightKind::Dig,
        };
        let task = self.tasks.mark_square(
            pos,
            highlight,
            TaskAction::Destruction {
                kind: destroy,
                furniture,
            },
            MinionActivity::Digging,
            bogus,
        )?;
        self.zones.on_destroy_order(pos);
        debug!(colony = %self.id, %pos, ?destroy, bogus, "destruction ordered");
        Ok(task)
    }

    /// Record `pos` as discovered. A bogus order waiting on it is dropped.
    /// Returns `false` if it was known already.
    pub fn add_known_tile(&mut self, pos: Position) -> bool {
        if !self.known.add_tile(pos) {
            return false;
        }
        if let Some(task) = self.tasks.marked(pos) {
            if self.tasks.task(task).is_some_and(|t| t.bogus) {
                self.tasks.remove_task(task);
                debug!(%pos, task = %task, "bogus order dropped");
            }
        }
        true
    }

    /// Claim `pos` into the territory. Furniture already standing there is
    /// recorded as built.
    pub fn claim_square(&mut self, pos: Position, world: &dyn World) {
        self.add_known_tile(pos);
        let fresh = self.territory.insert(pos);
        for layer in LAYERS {
            let Some(kind) = world.furniture_at(pos, layer) else {
                continue;
            };
            let is_building = self
                .furniture
                .info(kind)
                .is_some_and(|i| i.destroy == DestroyKind::Bash && !i.trap);
            if is_building && !self.constructions.contains_furniture(pos, layer) {
                self.constructions.on_constructed(pos, layer, kind);
            }
        }
        if fresh {
            self.notices.push(Notice::ClaimedSquare { pos });
        }
    }

    /// `kind` was built at `pos`.
    pub fn on_constructed(&mut self, pos: Position, kind: FurnitureKind, world: &dyn World) {
        let layer = self.furniture.layer_of(kind);
        let forget = self
            .furniture
            .info(kind)
            .is_some_and(|i| i.forget_after_building);
        if forget {
            self.constructions.remove_furniture_plan(pos, layer);
            debug!(%pos, ?kind, "built and forgotten");
            return;
        }
        self.constructions.on_constructed(pos, layer, kind);
        if let Some(task) = self.tasks.marked(pos) {
            self.tasks.remove_task(task);
        }
        self.claim_square(pos, world);
        info!(colony = %self.id, %pos, ?kind, "furniture built");
        self.notices.push(Notice::Constructed { pos, kind });
    }

    /// The furniture at `(pos, layer)` was removed by a destruction task.
    pub fn on_destructed(
        &mut self,
        pos: Position,
        layer: FurnitureLayer,
        destroy: DestroyKind,
        world: &dyn World,
    ) {
        self.constructions.remove_furniture_plan(pos, layer);
        match destroy {
            DestroyKind::Cut => self.zones.set_zone(pos, colony_types::ZoneKind::FetchItems),
            DestroyKind::Dig => self.claim_square(pos, world),
            DestroyKind::Bash => {}
        }
    }

    // -- traps --------------------------------------------------------------

    /// Plan a trap of `kind` at `pos` inside the territory.
    ///
    /// # Errors
    ///
    /// [`ColonyError::CannotBuild`] for non-trap kinds or squares outside
    /// the territory, [`ColonyError::Site`] if a trap is planned there.
    pub fn add_trap(&mut self, pos: Position, kind: FurnitureKind) -> Result<(), ColonyError> {
        let is_trap = self.furniture.info(kind).is_some_and(|i| i.trap);
        if !is_trap || !self.territory.contains(pos) {
            return Err(ColonyError::CannotBuild { pos, kind });
        }
        self.constructions.add_trap(pos, kind)?;
        Ok(())
    }

    /// Drop the trap plan at `pos` and its placement task.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] if the refund fails.
    pub fn remove_trap(&mut self, pos: Position, env: &mut Env<'_>) -> Result<bool, ColonyError> {
        if self.constructions.remove_trap(pos).is_none() {
            return Ok(false);
        }
        if let Some(task) = self.trap_tasks.remove(&pos) {
            let cost = self.tasks.remove_task(task);
            self.refund(cost, env)?;
        }
        Ok(true)
    }

    /// Pair unarmed traps with unclaimed trap kits lying in the territory.
    /// Kits that are missing are ordered from the workshops. Returns the
    /// number of placement tasks created.
    pub fn sync_traps(&mut self, env: &Env<'_>) -> usize {
        let mut kits: Vec<(Position, Item)> = self
            .territory
            .all()
            .iter()
            .flat_map(|pos| env.world.items_at(*pos).into_iter().map(|i| (*pos, i)))
            .filter(|(_, item)| item.trap.is_some() && !self.is_item_marked(item.id))
            .collect();
        let mut missing: BTreeMap<FurnitureKind, u32> = BTreeMap::new();
        let mut created = 0_usize;
        for pos in self.constructions.all_traps() {
            let Some(trap) = self.constructions.trap(pos).copied() else {
                continue;
            };
            if trap.armed || self.is_delayed(pos, env.now) {
                continue;
            }
            if trap.marked
                && self
                    .trap_tasks
                    .get(&pos)
                    .is_some_and(|task| self.task_alive(*task))
            {
                continue;
            }
            let Some(index) = kits.iter().position(|(_, i)| i.trap == Some(trap.kind)) else {
                let slot = missing.entry(trap.kind).or_insert(0);
                *slot = slot.saturating_add(1);
                continue;
            };
            let (_, kit) = kits.swap_remove(index);
            let task = self.tasks.add_task(
                TaskAction::Chain(vec![
                    TaskAction::PickUp { items: vec![kit.id] },
                    TaskAction::ApplyTrap {
                        item: kit.id,
                        target: pos,
                    },
                ]),
                pos,
                MinionActivity::Construction,
            );
            self.mark_items(&[kit.id], task);
            self.trap_tasks.insert(pos, task);
            if let Some(plan) = self.constructions.trap_mut(pos) {
                plan.marked = true;
            }
            created = created.saturating_add(1);
        }
        for (kind, count) in missing {
            let queued = self
                .workshops
                .schedule_auto_production(|o| o.trap == Some(kind), count);
            if queued > 0 {
                debug!(?kind, queued, "trap kits ordered");
            }
        }
        created
    }

    /// A trap kit was applied at `pos`.
    pub(super) fn on_trap_applied(&mut self, pos: Position, item: ItemId) {
        self.marked_items.remove(&item);
        self.trap_tasks.remove(&pos);
        if let Some(plan) = self.constructions.trap_mut(pos) {
            plan.armed = true;
            plan.marked = false;
        }
    }

    // -- construction sync --------------------------------------------------

    /// Fund every affordable unbuilt plan that has no live task: take its
    /// cost and queue a construction task. Plans that cannot be afforded
    /// wait for a later pass. Returns the number of tasks created.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] or [`ColonyError::Site`] on contract
    /// violations.
    pub fn sync_constructions(&mut self, env: &mut Env<'_>) -> Result<usize, ColonyError> {
        let mut funded = 0_usize;
        for (pos, layer) in self.constructions.all_furniture() {
            let Some(plan) = self.constructions.furniture(pos, layer).copied() else {
                continue;
            };
            if plan.is_built() {
                continue;
            }
            if let Some(task) = plan.task() {
                if self.task_alive(task) {
                    continue;
                }
                self.constructions.clear_task(pos, layer);
            }
            if self.is_delayed(pos, env.now) || !self.has_resource(&plan.cost, &*env.world) {
                continue;
            }
            self.take_resource(&plan.cost, env)?;
            let task = self.tasks.add_task_cost(
                TaskAction::Construction {
                    furniture: plan.kind,
                },
                pos,
                plan.cost,
                MinionActivity::Construction,
            );
            self.constructions.set_task(pos, layer, task)?;
            info!(colony = %self.id, %pos, kind = ?plan.kind, cost = plan.cost.value, "construction funded");
            funded = funded.saturating_add(1);
        }
        Ok(funded)
    }

    /// Drop unbuilt plans the world no longer supports, refunding their
    /// tasks. Returns how many were dropped.
    pub(super) fn clear_unsupported_plans(&mut self, env: &mut Env<'_>) -> Result<usize, ColonyError> {
        let world: &dyn World = &*env.world;
        let territory = &self.territory;
        let catalog = &self.furniture;
        let removed = self.constructions.clear_unsupported_plans(|pos, kind| {
            let outside_ok = catalog
                .info(kind)
                .is_some_and(|i| i.build_outside_territory);
            (territory.contains(pos) || outside_ok) && world.can_construct(pos, kind)
        });
        for (pos, _, plan) in &removed {
            debug!(%pos, kind = ?plan.kind, "unsupported plan dropped");
            if let Some(task) = plan.task() {
                let cost = self.tasks.remove_task(task);
                self.refund(cost, env)?;
            }
        }
        Ok(removed.len())
    }

    // -- hazards ------------------------------------------------------------

    /// Avoid tasks within the delay radius of `enemies` until `until`. The
    /// enemy squares themselves are always delayed; the radius spreads
    /// through the territory only.
    pub(super) fn delay_dangerous_tasks(&mut self, enemies: &[Position], until: u64) {
        let radius = self.config.timing.delay_radius;
        let mut seen: BTreeSet<Position> = enemies.iter().copied().collect();
        let mut queue: VecDeque<(Position, u32)> = enemies.iter().map(|p| (*p, 0)).collect();
        while let Some((pos, dist)) = queue.pop_front() {
            self.delayed.insert(pos, until);
            if dist >= radius {
                continue;
            }
            for next in pos.neighbors8() {
                if self.territory.contains(next) && seen.insert(next) {
                    queue.push_back((next, dist.saturating_add(1)));
                }
            }
        }
    }

    /// Fighter difficulty plus the menace of built furniture. Cached until
    /// the next tick.
    pub fn danger_level(&mut self, world: &dyn World) -> u32 {
        if let Some(level) = self.danger {
            return level;
        }
        let fighters = self
            .roster
            .with_trait(colony_types::MinionTrait::Fighter)
            .iter()
            .map(|f| world.difficulty_points(*f))
            .fold(0_u32, u32::saturating_add);
        let furniture = self
            .constructions
            .all_furniture()
            .into_iter()
            .filter_map(|(pos, layer)| self.constructions.furniture(pos, layer))
            .filter(|plan| plan.is_built())
            .filter_map(|plan| self.furniture.info(plan.kind))
            .map(|info| info.danger)
            .fold(0_u32, u32::saturating_add);
        let level = fighters.saturating_add(furniture);
        self.danger = Some(level);
        level
    }

    /// Publish an escalation when the danger level reaches a new multiple
    /// of the configured step.
    pub(super) fn check_danger(&mut self, world: &dyn World) {
        let step = self.config.danger_escalation_step;
        let level = self.danger_level(world);
        let threshold = level
            .checked_div(step)
            .map_or(0, |n| n.saturating_mul(step));
        if threshold > self.danger_announced {
            self.danger_announced = threshold;
            info!(colony = %self.id, level, "danger escalated");
            self.publish(GameEvent::DangerEscalated {
                colony: self.id,
                level,
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{CostInfo, ResourceKind, SunlightState, TribeId, ZoneKind};

    use crate::config::ColonyConfig;
    use crate::dice::ScriptedDice;
    use crate::sandbox::SandboxWorld;

    use super::*;

    const SPOT: Position = Position::new(0, 2, 2);

    fn claimed(world: &SandboxWorld) -> Colony {
        let mut colony = Colony::new(TribeId(1), ColonyConfig::default());
        for x in 0..5 {
            for y in 0..5 {
                colony.claim_square(Position::new(0, x, y), world);
            }
        }
        colony
    }

    #[test]
    fn planning_needs_known_territory() {
        let world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        let outside = Position::new(0, 8, 8);
        assert!(!colony.add_furniture(outside, FurnitureKind::Bed, false, &world).unwrap());
        assert!(colony.add_furniture(SPOT, FurnitureKind::Bed, false, &world).unwrap());
        // One plan per square and layer.
        assert!(!colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap());
        // Another layer is fine.
        assert!(colony.add_furniture(SPOT, FurnitureKind::Torch, false, &world).unwrap());
        assert_eq!(colony.debt(ResourceKind::Wood), 7);
    }

    #[test]
    fn sync_funds_affordable_plans_only() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap();
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        assert_eq!(colony.sync_constructions(&mut env).unwrap(), 0);
        colony.add_credit(ResourceKind::Wood, 5);
        assert_eq!(colony.sync_constructions(&mut env).unwrap(), 1);
        assert_eq!(colony.ledger().credit(ResourceKind::Wood), 0);
        assert_eq!(colony.debt(ResourceKind::Wood), 0);
        // A live task is not funded twice.
        assert_eq!(colony.sync_constructions(&mut env).unwrap(), 0);
        let plan = colony.constructions().furniture(SPOT, FurnitureLayer::Middle).unwrap();
        assert!(plan.task().is_some());
    }

    #[test]
    fn removing_a_funded_plan_refunds() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap();
        colony.add_credit(ResourceKind::Wood, 5);
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        colony.sync_constructions(&mut env).unwrap();
        assert!(colony
            .remove_unbuilt_furniture(SPOT, FurnitureLayer::Middle, &mut env)
            .unwrap());
        assert_eq!(colony.ledger().credit(ResourceKind::Wood), 5);
        assert!(colony.tasks().tasks_of(MinionActivity::Construction).is_empty());
    }

    #[test]
    fn bogus_dig_is_dropped_when_discovered() {
        let world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        let unknown = Position::new(0, 7, 7);
        let task = colony.order_destruction(unknown, &world).unwrap();
        assert!(colony.tasks().task(task).unwrap().bogus);
        assert!(colony.add_known_tile(unknown));
        assert!(colony.tasks().task(task).is_none());
    }

    #[test]
    fn known_empty_square_has_nothing_to_destroy() {
        let world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        assert!(matches!(
            colony.order_destruction(SPOT, &world),
            Err(ColonyError::NothingToDestroy { .. })
        ));
    }

    #[test]
    fn cut_tree_becomes_fetch_zone_and_dig_claims() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        let tree = Position::new(0, 4, 4);
        world.set_furniture(tree, FurnitureLayer::Middle, Some(FurnitureKind::Tree));
        colony.order_destruction(tree, &world).unwrap();
        assert_eq!(colony.tasks().highlight(tree), Some(HighlightKind::CutTree));
        colony.on_destructed(tree, FurnitureLayer::Middle, DestroyKind::Cut, &world);
        assert!(colony.zones().is_zone(tree, ZoneKind::FetchItems));
        let rock = Position::new(0, 6, 6);
        colony.on_destructed(rock, FurnitureLayer::Middle, DestroyKind::Dig, &world);
        assert!(colony.territory().contains(rock));
        assert!(colony.known_tiles().is_known(rock));
    }

    #[test]
    fn bridges_are_forgotten_after_building() {
        let world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        let river = Position::new(0, 3, 0);
        colony
            .add_furniture(river, FurnitureKind::Bridge, true, &world)
            .unwrap();
        colony.on_constructed(river, FurnitureKind::Bridge, &world);
        assert!(!colony.constructions().contains_furniture(river, FurnitureLayer::Floor));
    }

    #[test]
    fn traps_pair_with_kits_in_territory() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        colony.add_trap(SPOT, FurnitureKind::BoulderTrap).unwrap();
        assert!(matches!(
            colony.add_trap(Position::new(0, 9, 9), FurnitureKind::BoulderTrap),
            Err(ColonyError::CannotBuild { .. })
        ));
        let mut dice = ScriptedDice::new();
        {
            let env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
            assert_eq!(colony.sync_traps(&env), 0);
        }
        let queued: usize = colony
            .workshops()
            .kinds()
            .into_iter()
            .filter_map(|k| colony.workshops().get(k))
            .map(|w| w.queued().len())
            .sum();
        assert!(queued > 0);
        let kit = world.put_item(Position::new(0, 1, 1), Item::trap_kit(FurnitureKind::BoulderTrap));
        let env = Env::new(&mut world, &mut dice, 2, SunlightState::Day);
        assert_eq!(colony.sync_traps(&env), 1);
        assert!(colony.is_item_marked(kit));
        assert!(colony.constructions().trap(SPOT).unwrap().marked);
        assert_eq!(colony.sync_traps(&env), 0);
    }

    #[test]
    fn delays_spread_through_territory_within_radius() {
        let world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        colony.delay_dangerous_tasks(&[Position::new(0, 5, 2)], 50);
        assert!(colony.is_delayed(Position::new(0, 4, 2), 10));
        assert!(colony.is_delayed(Position::new(0, 0, 0), 10));
        assert!(!colony.is_delayed(Position::new(0, 4, 2), 50));
        assert!(colony.is_delayed(Position::new(0, 5, 2), 10));
        assert!(!colony.is_delayed(Position::new(0, 6, 2), 10));
    }

    #[test]
    fn delayed_plans_are_not_funded() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = claimed(&world);
        colony
            .add_furniture(SPOT, FurnitureKind::Door, false, &world)
            .unwrap();
        colony.add_credit(ResourceKind::Wood, 5);
        colony.delay_dangerous_tasks(&[SPOT], 10);
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        assert_eq!(colony.sync_constructions(&mut env).unwrap(), 0);
        assert!(colony.has_resource(&CostInfo::new(ResourceKind::Wood, 5), &*env.world));
    }
}
