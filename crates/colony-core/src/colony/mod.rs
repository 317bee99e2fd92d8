//! The colony context object.
//!
//! A [`Colony`] owns every per-colony subsystem (ledger, construction
//! registry, task queue, roster, zones, workshops) and is the only writer
//! to them. Subsystems never reach into each other; cross-cutting rules
//! such as "freeing a task refunds its cost" live here.
//!
//! Collaborators are passed in per call through [`Env`]. The colony never
//! stores a reference to the world or to its controller; messages for the
//! controller are queued as [`Notice`]s and events for other colonies are
//! queued in an outbox, both drained by the caller.
//!
//! # Submodules
//!
//! - `economy` -- resource queries, storage positions, debt, take/return.
//! - `membership` -- joining, leaving, banishment, traits, activities and
//!   eligibility.
//! - `building` -- furniture plans, destruction orders, claiming, traps,
//!   construction sync.
//! - `reactor` -- reactions to [`GameEvent`]s.
//! - `tick` -- the fixed per-tick sequence.
//! - `commands` -- task completion, furniture usage, trade, pillage,
//!   immigration, retirement, conquest transfer.
//!
//! [`Env`]: crate::world::Env

mod building;
mod commands;
mod economy;
mod membership;
mod reactor;
mod tick;

pub use tick::TickSummary;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use colony_agents::{EquipmentOwnership, Roster};
use colony_ledger::{ResourceCatalog, ResourceLedger};
use colony_site::{ConstructionRegistry, FurnitureCatalog, KnownTiles, Territory, Zones};
use colony_tasks::{TaskQueue, Workshops};
use colony_types::{
    AgentId, AlarmInfo, ColonyId, ConquerCondition, ItemId, MinionActivity, MinionTrait,
    PlayerMessage, PopulationStats, Position, TaskId, TribeId, Warning, ZoneKind,
};

use crate::config::ColonyConfig;
use crate::control::Notice;
use crate::event::GameEvent;
use crate::immigration::Immigration;

/// One colony: a keeper's dungeon or a villain's village.
#[derive(Debug, Clone)]
pub struct Colony {
    id: ColonyId,
    name: String,
    tribe: TribeId,
    config: ColonyConfig,
    furniture: FurnitureCatalog,

    ledger: ResourceLedger,
    constructions: ConstructionRegistry,
    territory: Territory,
    known: KnownTiles,
    zones: Zones,
    tasks: TaskQueue,
    workshops: Workshops,
    roster: Roster,
    equipment: EquipmentOwnership,
    immigration: Immigration,

    /// Items claimed by a live task. Entries whose task is gone are stale
    /// and ignored.
    marked_items: BTreeMap<ItemId, TaskId>,
    /// Placement task of each marked trap.
    trap_tasks: BTreeMap<Position, TaskId>,
    /// Positions near enemies and the time until which they are avoided.
    delayed: BTreeMap<Position, u64>,
    alarm: Option<AlarmInfo>,
    danger: Option<u32>,
    danger_announced: u32,

    warnings: BTreeSet<Warning>,
    recorded_events: BTreeSet<String>,
    kills: Vec<String>,
    points: u64,
    known_villains: BTreeSet<ColonyId>,
    conquest_announced: bool,

    outbox: Vec<GameEvent>,
    notices: Vec<Notice>,
}

impl Colony {
    /// Create an empty colony of `tribe`.
    pub fn new(tribe: TribeId, config: ColonyConfig) -> Self {
        Self {
            id: ColonyId::new(),
            name: config.name.clone(),
            tribe,
            config,
            furniture: FurnitureCatalog::standard(),
            ledger: ResourceLedger::new(ResourceCatalog::standard()),
            constructions: ConstructionRegistry::new(),
            territory: Territory::new(),
            known: KnownTiles::new(),
            zones: Zones::new(),
            tasks: TaskQueue::new(),
            workshops: Workshops::standard(),
            roster: Roster::new(),
            equipment: EquipmentOwnership::new(),
            immigration: Immigration::new(),
            marked_items: BTreeMap::new(),
            trap_tasks: BTreeMap::new(),
            delayed: BTreeMap::new(),
            alarm: None,
            danger: None,
            danger_announced: 0,
            warnings: BTreeSet::new(),
            recorded_events: BTreeSet::new(),
            kills: Vec::new(),
            points: 0,
            known_villains: BTreeSet::new(),
            conquest_announced: false,
            outbox: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Replace the furniture catalog.
    #[must_use]
    pub fn with_furniture(mut self, furniture: FurnitureCatalog) -> Self {
        self.furniture = furniture;
        self
    }

    // -- read-only views ----------------------------------------------------

    /// Colony id.
    pub const fn id(&self) -> ColonyId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tribe of the colony's members.
    pub const fn tribe(&self) -> TribeId {
        self.tribe
    }

    /// Behaviour and tuning.
    pub const fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Furniture catalog.
    pub const fn furniture_catalog(&self) -> &FurnitureCatalog {
        &self.furniture
    }

    /// Resource ledger.
    pub const fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Construction registry.
    pub const fn constructions(&self) -> &ConstructionRegistry {
        &self.constructions
    }

    /// Claimed squares.
    pub const fn territory(&self) -> &Territory {
        &self.territory
    }

    /// Discovered squares.
    pub const fn known_tiles(&self) -> &KnownTiles {
        &self.known
    }

    /// Zone tags.
    pub const fn zones(&self) -> &Zones {
        &self.zones
    }

    /// Task queue.
    pub const fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    /// Workshops.
    pub const fn workshops(&self) -> &Workshops {
        &self.workshops
    }

    /// Members.
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Equipment ownership.
    pub const fn equipment(&self) -> &EquipmentOwnership {
        &self.equipment
    }

    /// Pending immigration offers.
    pub const fn immigration(&self) -> &Immigration {
        &self.immigration
    }

    /// Active alarm.
    pub const fn alarm(&self) -> Option<AlarmInfo> {
        self.alarm
    }

    /// Active warnings.
    pub const fn warnings(&self) -> &BTreeSet<Warning> {
        &self.warnings
    }

    /// Notable event descriptions not yet used.
    pub const fn recorded_events(&self) -> &BTreeSet<String> {
        &self.recorded_events
    }

    /// Names of enemies killed by members.
    pub fn kills(&self) -> &[String] {
        &self.kills
    }

    /// Sum of the difficulty of killed enemies.
    pub const fn points(&self) -> u64 {
        self.points
    }

    /// Villain colonies this colony knows about.
    pub const fn known_villains(&self) -> &BTreeSet<ColonyId> {
        &self.known_villains
    }

    /// Task descriptions, grouped by activity in insertion order.
    pub fn task_descriptions(&self) -> Vec<(TaskId, MinionActivity, String)> {
        MinionActivity::ALL
            .into_iter()
            .flat_map(|activity| self.tasks.tasks_of(activity))
            .filter_map(|id| self.tasks.task(id))
            .map(|t| (t.id, t.activity, t.action.describe()))
            .collect()
    }

    // -- population ---------------------------------------------------------

    /// Population limit: the base plus what built furniture adds.
    pub fn max_population(&self) -> u32 {
        self.constructions
            .all_furniture()
            .into_iter()
            .filter_map(|(pos, layer)| self.constructions.furniture(pos, layer))
            .filter(|plan| plan.is_built())
            .map(|plan| self.furniture.population_increase(plan.kind, 1))
            .fold(self.config.base_population, u32::saturating_add)
    }

    /// Counts for a presentation layer.
    pub fn population_stats(&self) -> PopulationStats {
        self.roster.stats(self.max_population())
    }

    /// Whether the conquest condition holds.
    pub fn is_conquered(&self) -> bool {
        match self.config.conquer_condition {
            ConquerCondition::KillFightersAndLeader => {
                self.roster.with_trait(MinionTrait::Fighter).is_empty()
                    && self.roster.leaders().is_empty()
            }
            ConquerCondition::KillLeader => self.roster.leaders().is_empty(),
            ConquerCondition::Never => false,
        }
    }

    /// Whether losing `agent` can make the colony conquered.
    fn needed_for_conquest(&self, agent: AgentId) -> bool {
        match self.config.conquer_condition {
            ConquerCondition::KillFightersAndLeader => {
                self.roster.has_trait(agent, MinionTrait::Fighter)
                    || self.roster.has_trait(agent, MinionTrait::Leader)
            }
            ConquerCondition::KillLeader => self.roster.has_trait(agent, MinionTrait::Leader),
            ConquerCondition::Never => false,
        }
    }

    fn announce_conquest(&mut self, victim: AgentId, killer: Option<AgentId>) {
        if self.conquest_announced {
            return;
        }
        self.conquest_announced = true;
        info!(colony = %self.id, name = %self.name, "colony conquered");
        self.notices.push(Notice::Conquered { victim, killer });
        self.publish(GameEvent::ConqueredEnemy {
            colony: self.id,
            name: self.name.clone(),
        });
    }

    // -- zones --------------------------------------------------------------

    /// Tag `pos` with `kind`.
    pub fn set_zone(&mut self, pos: Position, kind: ZoneKind) {
        self.zones.set_zone(pos, kind);
    }

    /// Remove the `kind` tag from `pos`.
    pub fn erase_zone(&mut self, pos: Position, kind: ZoneKind) {
        self.zones.erase_zone(pos, kind);
    }

    /// Record a villain colony as discovered.
    pub fn discover_villain(&mut self, villain: ColonyId) {
        if villain != self.id {
            self.known_villains.insert(villain);
        }
    }

    // -- outputs ------------------------------------------------------------

    /// Events for other colonies produced since the last call.
    pub fn drain_outbox(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Notices for the controller produced since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn publish(&mut self, event: GameEvent) {
        debug!(colony = %self.id, event = event.name(), "event queued");
        self.outbox.push(event);
    }

    fn message(&mut self, message: PlayerMessage) {
        debug!(colony = %self.id, text = %message.text, priority = ?message.priority, "message");
        self.notices.push(Notice::Message(message));
    }

    fn record_event(&mut self, description: String) {
        debug!(colony = %self.id, %description, "event recorded");
        self.recorded_events.insert(description);
    }

    // -- task bookkeeping shared by the passes ------------------------------

    fn task_alive(&self, task: TaskId) -> bool {
        self.tasks.task(task).is_some_and(|t| !t.done)
    }

    /// Whether a live task claims `item`.
    pub fn is_item_marked(&self, item: ItemId) -> bool {
        self.marked_items
            .get(&item)
            .is_some_and(|task| self.task_alive(*task))
    }

    fn mark_items(&mut self, items: &[ItemId], task: TaskId) {
        for item in items {
            self.marked_items.insert(*item, task);
        }
    }

    /// Whether tasks at `pos` are avoided because enemies are near.
    pub fn is_delayed(&self, pos: Position, now: u64) -> bool {
        self.delayed.get(&pos).is_some_and(|until| *until > now)
    }
}
