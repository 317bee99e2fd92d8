//! In-memory [`World`] for headless runs and tests.
//!
//! A rectangular map per level with items lying on squares, furniture per
//! layer, blocked squares, and creature bodies. Combat is not simulated:
//! callers stun, kill or raise alarms explicitly and the sandbox records
//! the matching [`GameEvent`]s for the next drain.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use colony_agents::AgentService;
use colony_ledger::ItemStore;
use colony_site::FurnitureCatalog;
use colony_types::{
    AgentId, ColonyId, ExperienceKind, FurnitureKind, FurnitureLayer, Item, ItemId, LastingEffect,
    MinionActivity, Position, ResourceKind, TribeId,
};

use crate::event::GameEvent;
use crate::world::World;

/// Wood left behind by a felled tree.
const TREE_WOOD: u32 = 3;

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// A creature in the sandbox.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Display name.
    pub name: String,
    /// Species name.
    pub species: String,
    /// Humanoid body.
    pub humanoid: bool,
    /// Morale in `[-1, 1]`.
    pub morale: f64,
    /// Allegiance.
    pub tribe: TribeId,
    /// Controlling colony.
    pub controller: Option<ColonyId>,
    /// Keeps its controller when joining a colony.
    pub keeps_controller: bool,
    /// Free automaton part slots.
    pub automaton_slots: u32,
    /// Installed automaton parts.
    pub parts: Vec<Item>,
    /// Combat difficulty.
    pub difficulty: u32,
    /// Where it stands.
    pub position: Option<Position>,
    /// Carried items.
    pub equipment: Vec<ItemId>,
    /// Activities it cannot perform.
    pub incapable: BTreeSet<MinionActivity>,
    effects: BTreeMap<LastingEffect, Option<u64>>,
    experience: BTreeMap<ExperienceKind, f64>,
    enemies: BTreeSet<AgentId>,
    alive: bool,
}

impl Body {
    /// A living, non-humanoid creature of `species` with no allegiance.
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            humanoid: false,
            morale: 0.0,
            tribe: TribeId::MONSTER,
            controller: None,
            keeps_controller: false,
            automaton_slots: 0,
            parts: Vec::new(),
            difficulty: 10,
            position: None,
            equipment: Vec::new(),
            incapable: BTreeSet::new(),
            effects: BTreeMap::new(),
            experience: BTreeMap::new(),
            enemies: BTreeSet::new(),
            alive: true,
        }
    }

    /// Make the body humanoid.
    #[must_use]
    pub const fn humanoid(mut self) -> Self {
        self.humanoid = true;
        self
    }

    /// Place the body.
    #[must_use]
    pub const fn at(mut self, pos: Position) -> Self {
        self.position = Some(pos);
        self
    }

    /// Set the allegiance.
    #[must_use]
    pub const fn tribe(mut self, tribe: TribeId) -> Self {
        self.tribe = tribe;
        self
    }

    /// Set the combat difficulty.
    #[must_use]
    pub const fn difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Give automaton part slots.
    #[must_use]
    pub const fn automaton(mut self, slots: u32) -> Self {
        self.automaton_slots = slots;
        self
    }

    /// Set the starting morale.
    #[must_use]
    pub const fn morale(mut self, morale: f64) -> Self {
        self.morale = morale;
        self
    }

    /// Experience gathered on one track.
    pub fn experience(&self, kind: ExperienceKind) -> f64 {
        self.experience.get(&kind).copied().unwrap_or(0.0)
    }

    /// Whether the body holds a grudge against `other`.
    pub fn is_private_enemy(&self, other: AgentId) -> bool {
        self.enemies.contains(&other)
    }

    /// Whether it is alive.
    pub const fn is_alive(&self) -> bool {
        self.alive
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Rectangular in-memory world.
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    width: i32,
    height: i32,
    now: u64,
    catalog: FurnitureCatalog,
    bodies: BTreeMap<AgentId, Body>,
    items: BTreeMap<Position, Vec<Item>>,
    furniture: BTreeMap<(Position, FurnitureLayer), FurnitureKind>,
    blocked: BTreeSet<Position>,
    events: Vec<GameEvent>,
}

impl SandboxWorld {
    /// An empty `width` x `height` map.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            now: 0,
            catalog: FurnitureCatalog::standard(),
            bodies: BTreeMap::new(),
            items: BTreeMap::new(),
            furniture: BTreeMap::new(),
            blocked: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    /// Whether `pos` lies on the map.
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    // -- setup --------------------------------------------------------------

    /// Add a creature. Returns its id.
    pub fn spawn(&mut self, body: Body) -> AgentId {
        let id = AgentId::new();
        self.bodies.insert(id, body);
        id
    }

    /// Body of `agent`.
    pub fn body(&self, agent: AgentId) -> Option<&Body> {
        self.bodies.get(&agent)
    }

    /// Mutable body of `agent`.
    pub fn body_mut(&mut self, agent: AgentId) -> Option<&mut Body> {
        self.bodies.get_mut(&agent)
    }

    /// Put one item on `pos`. Returns its id.
    pub fn put_item(&mut self, pos: Position, item: Item) -> ItemId {
        let id = item.id;
        self.items.entry(pos).or_default().push(item);
        id
    }

    /// Give an item to `agent` (carried, not on the map).
    pub fn give_item(&mut self, agent: AgentId, item: ItemId) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.equipment.push(item);
        }
    }

    /// Make `pos` impassable and unbuildable.
    pub fn block(&mut self, pos: Position) {
        self.blocked.insert(pos);
    }

    /// Record a grudge of `agent` against `other`.
    pub fn add_private_enemy(&mut self, agent: AgentId, other: AgentId) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.enemies.insert(other);
        }
    }

    // -- scripted happenings ------------------------------------------------

    /// Knock `victim` out.
    pub fn stun(&mut self, victim: AgentId, attacker: Option<AgentId>) {
        if let Some(body) = self.bodies.get_mut(&victim) {
            body.effects.insert(LastingEffect::Stunned, None);
            self.events.push(GameEvent::CreatureStunned { victim, attacker });
        }
    }

    /// Sound an alarm at `pos`.
    pub fn raise_alarm(&mut self, pos: Position, silent: bool) {
        self.events.push(GameEvent::Alarm { pos, silent });
    }

    /// Destroy the furniture at `(pos, layer)`.
    pub fn destroy_furniture(&mut self, pos: Position, layer: FurnitureLayer) {
        if let Some(kind) = self.furniture.remove(&(pos, layer)) {
            self.events
                .push(GameEvent::FurnitureDestroyed { pos, layer, kind });
        }
    }

    /// An intruder disarms the trap at `pos`.
    pub fn disarm_trap(&mut self, pos: Position, disarmer: AgentId) {
        if self.furniture.remove(&(pos, FurnitureLayer::Middle)).is_some() {
            self.events.push(GameEvent::TrapDisarmed { pos, disarmer });
        }
    }

    // -- inspection ---------------------------------------------------------

    /// Units of `kind` lying anywhere on the map.
    pub fn total_resource(&self, kind: ResourceKind) -> u32 {
        let count = self
            .items
            .values()
            .flatten()
            .filter(|i| i.resource == Some(kind))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Number of items lying on the map.
    pub fn item_count(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    /// Living creatures.
    pub fn living(&self) -> Vec<AgentId> {
        self.bodies
            .iter()
            .filter(|(_, b)| b.alive)
            .map(|(id, _)| *id)
            .collect()
    }

    fn effect_active(&self, body: &Body, effect: LastingEffect) -> bool {
        body.effects
            .get(&effect)
            .is_some_and(|until| until.is_none_or(|t| t >= self.now))
    }
}

impl ItemStore for SandboxWorld {
    fn count_resource(&self, pos: Position, kind: ResourceKind) -> u32 {
        let count = self
            .items
            .get(&pos)
            .map_or(0, |items| items.iter().filter(|i| i.resource == Some(kind)).count());
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn remove_resource(&mut self, pos: Position, kind: ResourceKind, count: u32) -> u32 {
        let Some(items) = self.items.get_mut(&pos) else {
            return 0;
        };
        let mut removed = 0_u32;
        items.retain(|i| {
            if removed < count && i.resource == Some(kind) {
                removed = removed.saturating_add(1);
                false
            } else {
                true
            }
        });
        if items.is_empty() {
            self.items.remove(&pos);
        }
        removed
    }

    fn drop_resource(&mut self, pos: Position, kind: ResourceKind, count: u32) {
        if count == 0 {
            return;
        }
        let pile = self.items.entry(pos).or_default();
        for _ in 0..count {
            pile.push(Item::resource(kind));
        }
    }
}

impl AgentService for SandboxWorld {
    fn exists(&self, agent: AgentId) -> bool {
        self.bodies.get(&agent).is_some_and(|b| b.alive)
    }

    fn name(&self, agent: AgentId) -> String {
        self.bodies
            .get(&agent)
            .map(|b| b.name.clone())
            .unwrap_or_default()
    }

    fn species(&self, agent: AgentId) -> String {
        self.bodies
            .get(&agent)
            .map(|b| b.species.clone())
            .unwrap_or_default()
    }

    fn is_humanoid(&self, agent: AgentId) -> bool {
        self.bodies.get(&agent).is_some_and(|b| b.humanoid)
    }

    fn morale(&self, agent: AgentId) -> f64 {
        self.bodies.get(&agent).map_or(0.0, |b| b.morale)
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn add_morale(&mut self, agent: AgentId, delta: f64) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.morale = (body.morale + delta).clamp(-1.0, 1.0);
        }
    }

    fn can_perform(&self, agent: AgentId, activity: MinionActivity) -> bool {
        self.bodies
            .get(&agent)
            .is_some_and(|b| b.alive && !b.incapable.contains(&activity))
    }

    fn has_effect(&self, agent: AgentId, effect: LastingEffect) -> bool {
        self.bodies
            .get(&agent)
            .is_some_and(|b| self.effect_active(b, effect))
    }

    fn add_effect(&mut self, agent: AgentId, effect: LastingEffect, until: Option<u64>) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.effects.insert(effect, until);
        }
    }

    fn remove_effect(&mut self, agent: AgentId, effect: LastingEffect) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.effects.remove(&effect);
        }
    }

    fn automaton_slots(&self, agent: AgentId) -> u32 {
        self.bodies.get(&agent).map_or(0, |b| b.automaton_slots)
    }

    fn difficulty_points(&self, agent: AgentId) -> u32 {
        self.bodies.get(&agent).map_or(0, |b| b.difficulty)
    }

    fn set_controller(&mut self, agent: AgentId, colony: ColonyId) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.controller = Some(colony);
        }
    }

    fn keeps_controller(&self, agent: AgentId) -> bool {
        self.bodies.get(&agent).is_some_and(|b| b.keeps_controller)
    }

    fn tribe(&self, agent: AgentId) -> TribeId {
        self.bodies.get(&agent).map_or(TribeId::MONSTER, |b| b.tribe)
    }

    fn set_tribe(&mut self, agent: AgentId, tribe: TribeId) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.tribe = tribe;
        }
    }

    fn remove_private_enemy(&mut self, agent: AgentId, other: AgentId) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.enemies.remove(&other);
        }
    }

    fn kill(&mut self, agent: AgentId, attacker: Option<AgentId>) {
        let Some(body) = self.bodies.get_mut(&agent) else {
            return;
        };
        if !body.alive {
            return;
        }
        body.alive = false;
        let position = body.position.take();
        if let Some(pos) = position {
            let corpse = Item {
                name: format!("{} corpse", body.name),
                ..Item::resource(ResourceKind::Corpse)
            };
            self.items.entry(pos).or_default().push(corpse);
        }
        debug!(agent = %agent, "creature killed");
        self.events.push(GameEvent::CreatureKilled {
            victim: agent,
            attacker,
        });
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn increase_experience(&mut self, agent: AgentId, kind: ExperienceKind, amount: f64) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            *body.experience.entry(kind).or_insert(0.0) += amount;
        }
    }

    fn equipment(&self, agent: AgentId) -> Vec<ItemId> {
        self.bodies
            .get(&agent)
            .map(|b| b.equipment.clone())
            .unwrap_or_default()
    }

    fn position(&self, agent: AgentId) -> Option<Position> {
        self.bodies.get(&agent).and_then(|b| b.position)
    }
}

impl World for SandboxWorld {
    fn begin_tick(&mut self, now: u64) {
        self.now = now;
    }

    fn items_at(&self, pos: Position) -> Vec<Item> {
        self.items.get(&pos).cloned().unwrap_or_default()
    }

    fn item_position(&self, item: ItemId) -> Option<Position> {
        self.items
            .iter()
            .find(|(_, items)| items.iter().any(|i| i.id == item))
            .map(|(pos, _)| *pos)
    }

    fn remove_items(&mut self, pos: Position, items: &[ItemId]) -> Vec<Item> {
        let Some(pile) = self.items.get_mut(&pos) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<Item>, Vec<Item>) =
            pile.drain(..).partition(|i| items.contains(&i.id));
        if kept.is_empty() {
            self.items.remove(&pos);
        } else {
            *pile = kept;
        }
        removed
    }

    fn drop_items(&mut self, pos: Position, items: Vec<Item>) {
        if !items.is_empty() {
            self.items.entry(pos).or_default().extend(items);
        }
    }

    fn furniture_at(&self, pos: Position, layer: FurnitureLayer) -> Option<FurnitureKind> {
        self.furniture.get(&(pos, layer)).copied()
    }

    fn set_furniture(&mut self, pos: Position, layer: FurnitureLayer, kind: Option<FurnitureKind>) {
        match kind {
            Some(k) => {
                self.furniture.insert((pos, layer), k);
            }
            None => {
                if self.furniture.remove(&(pos, layer)) == Some(FurnitureKind::Tree) {
                    self.drop_resource(pos, ResourceKind::Wood, TREE_WOOD);
                }
            }
        }
    }

    fn install_part(&mut self, agent: AgentId, part: Item) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.automaton_slots = body.automaton_slots.saturating_sub(1);
            body.parts.push(part);
        }
    }

    fn can_construct(&self, pos: Position, kind: FurnitureKind) -> bool {
        let layer = self.catalog.layer_of(kind);
        self.in_bounds(pos) && !self.blocked.contains(&pos) && !self.furniture.contains_key(&(pos, layer))
    }

    fn can_enter(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && !self.blocked.contains(&pos)
            && !matches!(
                self.furniture.get(&(pos, FurnitureLayer::Middle)),
                Some(FurnitureKind::Rock | FurnitureKind::Tree)
            )
    }

    fn enemy_positions(&self, tribe: TribeId, area: &[Position]) -> Vec<Position> {
        let area: BTreeSet<Position> = area.iter().copied().collect();
        let mut found: Vec<Position> = self
            .bodies
            .values()
            .filter(|b| {
                b.alive && b.tribe != tribe && !self.effect_active(b, LastingEffect::Stunned)
            })
            .filter_map(|b| b.position)
            .filter(|p| area.contains(p))
            .collect();
        found.sort();
        found.dedup();
        found
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
