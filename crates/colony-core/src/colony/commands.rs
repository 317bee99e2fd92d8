//! Commands issued by the controller: carrying out tasks, using
//! furniture, trade, pillage, immigration, retirement and conquest
//! transfer.

use tracing::{debug, info};

use colony_agents::{AgentService, TraitSet};
use colony_site::FurnitureUsage;
use colony_tasks::{TaskAction, TaskError};
use colony_types::{
    AgentId, ConquerCondition, CostInfo, Item, ItemClass, ItemId, LastingEffect,
    MinionActivity, MinionTrait, PlayerMessage, Position, ResourceKind, StorageKind, TaskId,
    WorkshopKind,
};

use crate::error::ColonyError;
use crate::event::GameEvent;
use crate::immigration::OfferKind;
use crate::world::{Env, World};

use super::Colony;
use super::building::LAYERS;

/// Experience gained per use of training furniture at neutral morale.
const TRAINING_RATE: f64 = 0.007;

/// Chance per use of a poetry table at neutral morale.
const POETRY_CHANCE: f64 = 0.01;

impl Colony {
    // -- tasks --------------------------------------------------------------

    /// Give `task` to the member `agent`.
    ///
    /// # Errors
    ///
    /// [`ColonyError::NotMember`] for non-members, [`ColonyError::Task`]
    /// when the task is unknown or taken or the agent is busy.
    pub fn claim_task(&mut self, agent: AgentId, task: TaskId) -> Result<(), ColonyError> {
        if !self.roster.contains(agent) {
            return Err(ColonyError::NotMember(agent));
        }
        self.tasks.claim(agent, task)?;
        Ok(())
    }

    /// `agent` finished `task`: the reserved cost is consumed and the
    /// action's effect applied.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Task`] for unknown tasks and for tasks `agent` does
    /// not hold, [`ColonyError::MissingItem`] when an item the action
    /// needs is gone.
    pub fn complete_task(
        &mut self,
        agent: AgentId,
        task: TaskId,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        self.tasks.task(task).ok_or(TaskError::UnknownTask(task))?;
        if self.tasks.holder_of(task) != Some(agent) {
            return Err(TaskError::NotHolder { task, agent }.into());
        }
        let done = self.tasks.complete(task)?;
        debug!(agent = %agent, task = %task, action = %done.action.describe(), "task completed");
        self.apply_action(agent, &done.action, done.position, env)
    }

    fn apply_action(
        &mut self,
        agent: AgentId,
        action: &TaskAction,
        pos: Position,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        match action {
            TaskAction::Construction { furniture } => {
                let layer = self.furniture.layer_of(*furniture);
                let planned = self
                    .constructions
                    .furniture(pos, layer)
                    .is_some_and(|p| p.kind == *furniture && !p.is_built());
                if planned {
                    env.world.set_furniture(pos, layer, Some(*furniture));
                    self.on_constructed(pos, *furniture, &*env.world);
                }
            }
            TaskAction::Destruction { kind, furniture } => {
                let layer = self.furniture.layer_of(*furniture);
                if env.world.furniture_at(pos, layer) == Some(*furniture) {
                    env.world.set_furniture(pos, layer, None);
                    self.on_destructed(pos, layer, *kind, &*env.world);
                }
            }
            TaskAction::GoToAndWait { .. } | TaskAction::PickUp { .. } => {}
            TaskAction::Drop { items, .. } => {
                for item in items {
                    self.marked_items.remove(item);
                    let Some(from) = env.world.item_position(*item) else {
                        continue;
                    };
                    if from != pos {
                        let moved = env.world.remove_items(from, &[*item]);
                        env.world.drop_items(pos, moved);
                    }
                }
            }
            TaskAction::ApplyTrap { item, target } => {
                let from = env
                    .world
                    .item_position(*item)
                    .ok_or(ColonyError::MissingItem(*item))?;
                let Some(trap) = self.constructions.trap(*target).copied() else {
                    // The plan was dropped meanwhile; the kit stays where it is.
                    self.marked_items.remove(item);
                    return Ok(());
                };
                env.world.remove_items(from, &[*item]);
                let layer = self.furniture.layer_of(trap.kind);
                env.world.set_furniture(*target, layer, Some(trap.kind));
                self.on_trap_applied(*target, *item);
                debug!(pos = %target, kind = ?trap.kind, "trap armed");
            }
            TaskAction::InstallPart { agent: automaton, item } => {
                let from = env
                    .world
                    .item_position(*item)
                    .ok_or(ColonyError::MissingItem(*item))?;
                for part in env.world.remove_items(from, &[*item]) {
                    env.world.install_part(*automaton, part);
                }
                self.equipment.discard(*item);
                self.marked_items.remove(item);
                info!(agent = %automaton, item = %item, "automaton part installed");
            }
            TaskAction::Whipping { agent: victim } => {
                env.world.add_morale(*victim, self.config.morale.whipping);
            }
            TaskAction::Torture { agent: victim } => {
                self.publish(GameEvent::CreatureTortured {
                    victim: *victim,
                    torturer: agent,
                });
            }
            TaskAction::Execute { agent: victim } | TaskAction::Disassemble { agent: victim } => {
                env.world.kill(*victim, Some(agent));
            }
            TaskAction::Chain(parts) => {
                for part in parts {
                    self.apply_action(agent, part, pos, env)?;
                }
            }
        }
        Ok(())
    }

    // -- furniture usage ----------------------------------------------------

    /// Positions of built furniture serving `activity`.
    pub fn furniture_for(&self, activity: MinionActivity) -> Vec<Position> {
        self.furniture
            .for_activity(activity)
            .into_iter()
            .flat_map(|kind| self.constructions.built_positions(kind))
            .collect()
    }

    /// `agent` used the furniture standing at `pos`.
    ///
    /// Punishment furniture queues a working task for someone else to
    /// carry out. Other furniture has an immediate effect scaled by the
    /// user's morale: twice as effective at full morale, half at the
    /// lowest.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] if crediting ritual piety fails.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn on_applied_square(
        &mut self,
        agent: AgentId,
        pos: Position,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        let usage = LAYERS.iter().find_map(|layer| {
            env.world
                .furniture_at(pos, *layer)
                .and_then(|kind| self.furniture.info(kind))
                .and_then(|info| info.usage)
        });
        let Some(usage) = usage else {
            return Ok(());
        };
        let efficiency = 2.0_f64.powf(env.world.morale(agent));
        match usage {
            FurnitureUsage::Whipping | FurnitureUsage::Torture | FurnitureUsage::Execution => {
                if !self.tasks.has_task_at(pos, MinionActivity::Working) {
                    let action = match usage {
                        FurnitureUsage::Whipping => TaskAction::Whipping { agent },
                        FurnitureUsage::Torture => TaskAction::Torture { agent },
                        _ => TaskAction::Execute { agent },
                    };
                    self.tasks.add_task(action, pos, MinionActivity::Working);
                }
            }
            FurnitureUsage::Poetry => {
                if env.dice.chance(POETRY_CHANCE * efficiency) {
                    self.write_poem(agent, pos, env);
                }
            }
            FurnitureUsage::Ritual => {
                let piety = if efficiency >= 2.0 {
                    2
                } else if efficiency >= 1.0 {
                    1
                } else {
                    0
                };
                self.return_resource(&CostInfo::new(ResourceKind::DemonPiety, piety), env)?;
            }
            FurnitureUsage::Train(kind) => {
                env.world
                    .increase_experience(agent, kind, TRAINING_RATE * efficiency);
            }
            FurnitureUsage::Workshop(kind) => {
                let items = self
                    .workshops
                    .get_mut(kind)
                    .map(|w| w.add_work(efficiency))
                    .unwrap_or_default();
                if !items.is_empty() {
                    let name = env.world.name(agent);
                    let text = match items.as_slice() {
                        [one] => format!("{name} produces {}", one.name),
                        many => format!("{name} produces {} items", many.len()),
                    };
                    info!(colony = %self.id, ?kind, count = items.len(), "workshop batch finished");
                    env.world.drop_items(pos, items);
                    self.message(PlayerMessage::new(text).at(Some(pos)));
                }
            }
            FurnitureUsage::Sleep => {}
        }
        Ok(())
    }

    fn write_poem(&mut self, agent: AgentId, pos: Position, env: &mut Env<'_>) {
        let mut poem = Item::new("poem", ItemClass::Misc);
        if !self.recorded_events.is_empty() && env.dice.one_in(3) {
            let topic = env
                .dice
                .choose_index(self.recorded_events.len())
                .and_then(|i| self.recorded_events.iter().nth(i).cloned());
            if let Some(topic) = topic {
                self.recorded_events.remove(&topic);
                poem.name = format!("poem about {topic}");
            }
        }
        let name = env.world.name(agent);
        env.world.drop_items(pos, vec![poem]);
        self.message(PlayerMessage::new(format!("{name} writes a poem")).at(Some(pos)));
    }

    // -- production ---------------------------------------------------------

    /// Queue one batch of production option `index` in workshop `kind`.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Task`] for unknown options.
    pub fn queue_production(&mut self, kind: WorkshopKind, index: usize) -> Result<(), ColonyError> {
        let workshop = self
            .workshops
            .get_mut(kind)
            .ok_or(colony_tasks::TaskError::UnknownOption(index))?;
        workshop.queue(index)?;
        debug!(colony = %self.id, ?kind, index, "production queued");
        Ok(())
    }

    // -- trade and pillage --------------------------------------------------

    /// Buy a for-sale item lying in `seller`'s territory. The price is
    /// taken in gold and the item moved to equipment storage.
    ///
    /// # Errors
    ///
    /// [`ColonyError::MissingItem`], [`ColonyError::NotForSale`],
    /// [`ColonyError::NoStorage`] or [`ColonyError::TooExpensive`]; nothing
    /// changes in those cases.
    pub fn buy_from(
        &mut self,
        seller: &Colony,
        item: ItemId,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        if seller.id == self.id {
            return Err(ColonyError::SameColony);
        }
        let from = env
            .world
            .item_position(item)
            .ok_or(ColonyError::MissingItem(item))?;
        let goods = env
            .world
            .items_at(from)
            .into_iter()
            .find(|i| i.id == item)
            .ok_or(ColonyError::MissingItem(item))?;
        if !goods.for_sale || !seller.territory.contains(from) {
            return Err(ColonyError::NotForSale(item));
        }
        let to = self
            .storage_positions(StorageKind::Equipment)
            .first()
            .copied()
            .ok_or(ColonyError::NoStorage {
                storage: StorageKind::Equipment,
            })?;
        let price = i64::from(goods.price);
        let budget = self.num_resource(ResourceKind::Gold, &*env.world);
        if price > budget {
            return Err(ColonyError::TooExpensive { price, budget });
        }
        self.take_resource(&CostInfo::new(ResourceKind::Gold, price), env)?;
        let bought: Vec<Item> = env
            .world
            .remove_items(from, &[item])
            .into_iter()
            .map(|mut i| {
                i.for_sale = false;
                i
            })
            .collect();
        env.world.drop_items(to, bought);
        info!(colony = %self.id, seller = %seller.id, item = %item, price, "item bought");
        Ok(())
    }

    /// Items lying in `victim`'s territory.
    pub fn pillage_options(victim: &Colony, world: &dyn World) -> Vec<Item> {
        victim
            .territory
            .all()
            .iter()
            .flat_map(|pos| world.items_at(*pos))
            .collect()
    }

    /// Move the listed items out of a conquered `victim`'s territory into
    /// this colony's matching storage. Returns how many were moved.
    ///
    /// # Errors
    ///
    /// [`ColonyError::NotConquered`] unless the victim is conquered,
    /// [`ColonyError::NoStorage`] when a listed item has nowhere to go
    /// (items before it stay moved).
    pub fn pillage_from(
        &mut self,
        victim: &Colony,
        items: &[ItemId],
        env: &mut Env<'_>,
    ) -> Result<usize, ColonyError> {
        if victim.id == self.id {
            return Err(ColonyError::SameColony);
        }
        if !victim.is_conquered() {
            return Err(ColonyError::NotConquered(victim.name.clone()));
        }
        let mut moved = 0_usize;
        for item in Self::pillage_options(victim, &*env.world)
            .into_iter()
            .filter(|i| items.contains(&i.id))
        {
            let storage = self
                .config
                .fetch_rules
                .iter()
                .find(|r| r.applies(&item))
                .map_or(StorageKind::Equipment, |r| r.storage);
            let to = self
                .storage_positions(storage)
                .first()
                .copied()
                .ok_or(ColonyError::NoStorage { storage })?;
            let Some(from) = env.world.item_position(item.id) else {
                continue;
            };
            let taken = env.world.remove_items(from, &[item.id]);
            env.world.drop_items(to, taken);
            moved = moved.saturating_add(1);
        }
        if moved > 0 {
            self.record_event(format!("the pillaging of {}", victim.name));
            info!(colony = %self.id, victim = %victim.id, moved, "pillaged");
        }
        Ok(moved)
    }

    // -- immigration --------------------------------------------------------

    /// Accept the offer at `index`. Recruits pay their fee first; captives
    /// wake up and join as prisoners. Returns the new member.
    ///
    /// # Errors
    ///
    /// [`ColonyError::UnknownOffer`] for a bad index, [`ColonyError::Ledger`]
    /// when the fee cannot be paid (the offer stays).
    pub fn accept_immigrant(
        &mut self,
        index: usize,
        env: &mut Env<'_>,
    ) -> Result<AgentId, ColonyError> {
        let offer = self
            .immigration
            .offers()
            .get(index)
            .cloned()
            .ok_or(ColonyError::UnknownOffer(index))?;
        let traits = match offer.kind {
            OfferKind::Recruit { cost, traits } => {
                if let Some(cost) = cost {
                    self.take_resource(&cost, env)?;
                }
                traits
            }
            OfferKind::Captive => {
                env.world.remove_effect(offer.agent, LastingEffect::Stunned);
                TraitSet::of(&[MinionTrait::Worker, MinionTrait::Prisoner, MinionTrait::NoLimit])
            }
        };
        self.immigration.take(index);
        self.add_member(offer.agent, traits, env)?;
        info!(colony = %self.id, agent = %offer.agent, "immigrant accepted");
        Ok(offer.agent)
    }

    /// Reject the offer at `index`. Rejected captives are killed.
    ///
    /// # Errors
    ///
    /// [`ColonyError::UnknownOffer`] for a bad index.
    pub fn reject_immigrant(&mut self, index: usize, env: &mut Env<'_>) -> Result<(), ColonyError> {
        let offer = self
            .immigration
            .take(index)
            .ok_or(ColonyError::UnknownOffer(index))?;
        if offer.kind == OfferKind::Captive {
            env.world.kill(offer.agent, None);
        }
        debug!(colony = %self.id, agent = %offer.agent, "immigrant rejected");
        Ok(())
    }

    // -- colony-wide --------------------------------------------------------

    /// The keeper retires: knowledge shrinks to the home level, villains
    /// are forgotten and the colony can be conquered normally.
    pub fn retire(&mut self) {
        let level = self.territory.all().iter().next().map_or(0, |p| p.level);
        self.known.limit_to_level(level);
        self.known_villains.clear();
        self.config.conquer_condition = ConquerCondition::KillFightersAndLeader;
        info!(colony = %self.id, level, "colony retired");
    }

    /// Move every member of `other` into this colony, keeping traits.
    /// Returns how many joined.
    ///
    /// # Errors
    ///
    /// [`ColonyError::SameColony`], or a contract violation from removal or
    /// joining. The transfer is not rolled back.
    pub fn absorb_conquered(
        &mut self,
        other: &mut Colony,
        env: &mut Env<'_>,
    ) -> Result<usize, ColonyError> {
        if other.id == self.id {
            return Err(ColonyError::SameColony);
        }
        let members = other.roster.members().to_vec();
        for agent in &members {
            let traits = other.roster.traits_of(*agent);
            other.remove_member(*agent, env)?;
            if !self.roster.contains(*agent) {
                self.add_member(*agent, traits, env)?;
            }
        }
        info!(colony = %self.id, from = %other.id, count = members.len(), "members absorbed");
        Ok(members.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{
        ExperienceKind, FurnitureKind, FurnitureLayer, SunlightState, TribeId, ZoneKind,
    };

    use crate::config::ColonyConfig;
    use crate::dice::ScriptedDice;
    use crate::sandbox::{Body, SandboxWorld};

    use super::*;

    const HOME: Position = Position::new(0, 3, 3);
    const STORE: Position = Position::new(0, 4, 4);

    fn colony(world: &SandboxWorld) -> Colony {
        let mut colony = Colony::new(TribeId(1), ColonyConfig::default());
        for x in 2..6 {
            for y in 2..6 {
                colony.claim_square(Position::new(0, x, y), world);
            }
        }
        colony
    }

    #[test]
    fn completing_a_construction_builds_it() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = colony(&world);
        let orc = world.spawn(Body::new("orc", "orc").at(HOME));
        colony.add_credit(ResourceKind::Wood, 6);
        colony
            .add_furniture(HOME, FurnitureKind::Bed, false, &world)
            .unwrap();
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        colony
            .add_member(orc, TraitSet::of(&[MinionTrait::Worker]), &mut env)
            .unwrap();
        colony.sync_constructions(&mut env).unwrap();
        let task = *colony
            .tasks()
            .tasks_of(MinionActivity::Construction)
            .first()
            .unwrap();
        colony.claim_task(orc, task).unwrap();
        colony.complete_task(orc, task, &mut env).unwrap();
        assert_eq!(
            env.world.furniture_at(HOME, FurnitureLayer::Middle),
            Some(FurnitureKind::Bed)
        );
        assert!(colony
            .constructions()
            .furniture(HOME, FurnitureLayer::Middle)
            .unwrap()
            .is_built());
        assert_eq!(colony.debt(ResourceKind::Wood), 0);
        assert_eq!(colony.max_population(), colony.config().base_population.saturating_add(1));
    }

    #[test]
    fn only_the_holder_completes_a_task() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = colony(&world);
        let orc = world.spawn(Body::new("orc", "orc").at(HOME));
        let imp = world.spawn(Body::new("imp", "imp").at(HOME));
        colony.add_credit(ResourceKind::Wood, 6);
        colony
            .add_furniture(HOME, FurnitureKind::Bed, false, &world)
            .unwrap();
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        for agent in [orc, imp] {
            colony
                .add_member(agent, TraitSet::of(&[MinionTrait::Worker]), &mut env)
                .unwrap();
        }
        colony.sync_constructions(&mut env).unwrap();
        let task = *colony
            .tasks()
            .tasks_of(MinionActivity::Construction)
            .first()
            .unwrap();
        assert!(matches!(
            colony.complete_task(orc, task, &mut env),
            Err(ColonyError::Task {
                source: TaskError::NotHolder { .. }
            })
        ));
        colony.claim_task(orc, task).unwrap();
        assert!(matches!(
            colony.complete_task(imp, task, &mut env),
            Err(ColonyError::Task {
                source: TaskError::NotHolder { .. }
            })
        ));
        assert!(colony.tasks().task(task).is_some());
        assert_eq!(env.world.furniture_at(HOME, FurnitureLayer::Middle), None);
        colony.complete_task(orc, task, &mut env).unwrap();
        assert_eq!(
            env.world.furniture_at(HOME, FurnitureLayer::Middle),
            Some(FurnitureKind::Bed)
        );
    }

    #[test]
    fn punishment_furniture_queues_one_working_task() {
        let mut world = SandboxWorld::new(10, 10);
        world.set_furniture(HOME, FurnitureLayer::Middle, Some(FurnitureKind::WhippingPost));
        let mut colony = colony(&world);
        let orc = world.spawn(Body::new("orc", "orc").at(HOME).morale(-0.5));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        colony
            .add_member(orc, TraitSet::of(&[MinionTrait::Fighter]), &mut env)
            .unwrap();
        assert_eq!(colony.furniture_for(MinionActivity::BeWhipped), vec![HOME]);
        colony.on_applied_square(orc, HOME, &mut env).unwrap();
        colony.on_applied_square(orc, HOME, &mut env).unwrap();
        let working = colony.tasks().tasks_of(MinionActivity::Working);
        assert_eq!(working.len(), 1);
        let task = *working.first().unwrap();
        colony.claim_task(orc, task).unwrap();
        colony.complete_task(orc, task, &mut env).unwrap();
        assert!(env.world.morale(orc) > -0.5);
    }

    #[test]
    fn ritual_yields_piety() {
        let mut world = SandboxWorld::new(10, 10);
        world.set_furniture(HOME, FurnitureLayer::Middle, Some(FurnitureKind::DemonShrine));
        let mut colony = colony(&world);
        let imp = world.spawn(Body::new("imp", "imp").at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        colony.on_applied_square(imp, HOME, &mut env).unwrap();
        assert_eq!(colony.num_resource(ResourceKind::DemonPiety, &*env.world), 1);
    }

    #[test]
    fn training_raises_experience() {
        let mut world = SandboxWorld::new(10, 10);
        world.set_furniture(HOME, FurnitureLayer::Middle, Some(FurnitureKind::TrainingDummy));
        let mut colony = colony(&world);
        let orc = world.spawn(Body::new("orc", "orc").at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        colony.on_applied_square(orc, HOME, &mut env).unwrap();
        drop(env);
        let xp = world.body(orc).unwrap().experience(ExperienceKind::Melee);
        assert!(xp > 0.0);
    }

    #[test]
    fn buying_takes_gold_and_moves_the_item() {
        let mut world = SandboxWorld::new(12, 12);
        let mut buyer = colony(&world);
        let mut seller = Colony::new(TribeId(2), ColonyConfig::default());
        let shop = Position::new(0, 9, 9);
        seller.claim_square(shop, &world);
        buyer.set_zone(STORE, ZoneKind::StorageEquipment);
        buyer.add_credit(ResourceKind::Gold, 30);
        let sword = world.put_item(shop, Item::new("sword", ItemClass::Weapon).with_price(25).for_sale());
        let junk = world.put_item(shop, Item::new("junk", ItemClass::Misc));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        assert!(matches!(
            buyer.buy_from(&seller, junk, &mut env),
            Err(ColonyError::NotForSale(_))
        ));
        buyer.buy_from(&seller, sword, &mut env).unwrap();
        assert_eq!(env.world.item_position(sword), Some(STORE));
        assert_eq!(buyer.num_resource(ResourceKind::Gold, &*env.world), 5);
    }

    #[test]
    fn too_expensive_changes_nothing() {
        let mut world = SandboxWorld::new(12, 12);
        let mut buyer = colony(&world);
        let mut seller = Colony::new(TribeId(2), ColonyConfig::default());
        let shop = Position::new(0, 9, 9);
        seller.claim_square(shop, &world);
        buyer.set_zone(STORE, ZoneKind::StorageEquipment);
        buyer.add_credit(ResourceKind::Gold, 10);
        let sword = world.put_item(shop, Item::new("sword", ItemClass::Weapon).with_price(25).for_sale());
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        let err = buyer.buy_from(&seller, sword, &mut env).unwrap_err();
        assert_eq!(err, ColonyError::TooExpensive { price: 25, budget: 10 });
        assert_eq!(env.world.item_position(sword), Some(shop));
    }

    #[test]
    fn pillage_needs_conquest() {
        let mut world = SandboxWorld::new(12, 12);
        let mut raider = colony(&world);
        raider.set_zone(STORE, ZoneKind::StorageResources);
        let mut victim = Colony::new(TribeId(2), ColonyConfig::default());
        let village = Position::new(0, 9, 9);
        victim.claim_square(village, &world);
        let chief = world.spawn(Body::new("chief", "human").at(village));
        let stone = world.put_item(village, Item::resource(ResourceKind::Stone));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        victim
            .add_member(chief, TraitSet::of(&[MinionTrait::Leader]), &mut env)
            .unwrap();
        assert!(matches!(
            raider.pillage_from(&victim, &[stone], &mut env),
            Err(ColonyError::NotConquered(_))
        ));
        victim.remove_member(chief, &mut env).unwrap();
        assert_eq!(Colony::pillage_options(&victim, &*env.world).len(), 1);
        assert_eq!(raider.pillage_from(&victim, &[stone], &mut env).unwrap(), 1);
        assert_eq!(env.world.item_position(stone), Some(STORE));
    }

    #[test]
    fn captives_join_as_prisoners_or_die() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = colony(&world);
        let elf = world.spawn(Body::new("elf", "elf").humanoid().tribe(TribeId(9)).at(HOME));
        let dwarf = world.spawn(Body::new("dwarf", "dwarf").tribe(TribeId(9)).at(HOME));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        env.world.add_effect(elf, LastingEffect::Stunned, None);
        colony.immigration.add_captive(elf, 1);
        colony.immigration.add_captive(dwarf, 1);
        assert!(matches!(
            colony.accept_immigrant(7, &mut env),
            Err(ColonyError::UnknownOffer(7))
        ));
        assert_eq!(colony.accept_immigrant(0, &mut env).unwrap(), elf);
        assert!(colony.roster().has_trait(elf, MinionTrait::Prisoner));
        assert!(!env.world.has_effect(elf, LastingEffect::Stunned));
        assert_eq!(env.world.tribe(elf), TribeId(1));
        colony.reject_immigrant(0, &mut env).unwrap();
        assert!(!env.world.exists(dwarf));
        assert!(colony.immigration().offers().is_empty());
    }

    #[test]
    fn recruit_fee_is_taken_before_joining() {
        let mut world = SandboxWorld::new(10, 10);
        let mut colony = colony(&world);
        let ogre = world.spawn(Body::new("ogre", "ogre").at(HOME));
        let fee = CostInfo::new(ResourceKind::Gold, 40);
        colony
            .immigration
            .add_recruit(ogre, Some(fee), TraitSet::of(&[MinionTrait::Fighter]), 0);
        colony.add_credit(ResourceKind::Gold, 30);
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        assert!(colony.accept_immigrant(0, &mut env).is_err());
        assert_eq!(colony.immigration().offers().len(), 1);
        colony.add_credit(ResourceKind::Gold, 10);
        colony.accept_immigrant(0, &mut env).unwrap();
        assert!(colony.roster().has_trait(ogre, MinionTrait::Fighter));
        assert_eq!(colony.num_resource(ResourceKind::Gold, &*env.world), 0);
    }

    #[test]
    fn retire_forgets_other_levels() {
        let world = SandboxWorld::new(10, 10);
        let mut colony = colony(&world);
        colony.add_known_tile(Position::new(1, 0, 0));
        colony.discover_villain(colony_types::ColonyId::new());
        colony.retire();
        assert!(!colony.known_tiles().is_known(Position::new(1, 0, 0)));
        assert!(colony.known_tiles().is_known(HOME));
        assert!(colony.known_villains().is_empty());
    }

    #[test]
    fn absorbing_moves_members_with_traits() {
        let mut world = SandboxWorld::new(10, 10);
        let mut winner = colony(&world);
        let mut loser = Colony::new(TribeId(2), ColonyConfig::default());
        let goblin = world.spawn(Body::new("goblin", "goblin").tribe(TribeId(2)));
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        loser
            .add_member(goblin, TraitSet::of(&[MinionTrait::Worker]), &mut env)
            .unwrap();
        assert_eq!(winner.absorb_conquered(&mut loser, &mut env).unwrap(), 1);
        assert!(loser.roster().is_empty());
        assert!(winner.roster().has_trait(goblin, MinionTrait::Worker));
        assert_eq!(env.world.tribe(goblin), TribeId(1));
    }
}
