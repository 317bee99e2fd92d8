//! The world seam and the per-call environment.
//!
//! The colony owns none of the agents, items or map squares it manages.
//! It reaches them through [`World`], which bundles the item store used by
//! the ledger, the agent service used by the roster, and the map queries
//! the construction and fetch passes need.
//!
//! [`Env`] is what every colony operation receives: the world, the dice
//! and the current time. It borrows; it never owns.

use colony_agents::AgentService;
use colony_ledger::ItemStore;
use colony_types::{
    AgentId, Dice, FurnitureKind, FurnitureLayer, Item, ItemId, Position, SunlightState, TribeId,
};

use crate::event::GameEvent;

/// Map, items and agents as the colony sees them.
pub trait World: ItemStore + AgentService {
    /// Called once at the start of every tick.
    fn begin_tick(&mut self, now: u64) {
        let _ = now;
    }

    /// Items lying at `pos`.
    fn items_at(&self, pos: Position) -> Vec<Item>;

    /// Where an item lies, if it lies on the map.
    fn item_position(&self, item: ItemId) -> Option<Position>;

    /// Remove the listed items from `pos`. Returns the removed ones.
    fn remove_items(&mut self, pos: Position, items: &[ItemId]) -> Vec<Item>;

    /// Put items on `pos`.
    fn drop_items(&mut self, pos: Position, items: Vec<Item>);

    /// Furniture standing at `(pos, layer)`.
    fn furniture_at(&self, pos: Position, layer: FurnitureLayer) -> Option<FurnitureKind>;

    /// Place or clear furniture at `(pos, layer)`.
    fn set_furniture(&mut self, pos: Position, layer: FurnitureLayer, kind: Option<FurnitureKind>);

    /// Fit `part` into an automaton, using up one of its free slots.
    fn install_part(&mut self, agent: AgentId, part: Item);

    /// Whether `kind` can be built at `pos` right now.
    fn can_construct(&self, pos: Position, kind: FurnitureKind) -> bool;

    /// Whether creatures can stand on `pos`.
    fn can_enter(&self, pos: Position) -> bool;

    /// Positions among `area` where a creature hostile to `tribe` stands.
    fn enemy_positions(&self, tribe: TribeId, area: &[Position]) -> Vec<Position>;

    /// Events produced by the world since the last call.
    fn drain_events(&mut self) -> Vec<GameEvent>;
}

/// Collaborators and time for one colony operation.
pub struct Env<'a> {
    /// The world.
    pub world: &'a mut dyn World,
    /// Randomness.
    pub dice: &'a mut dyn Dice,
    /// Current tick.
    pub now: u64,
    /// Current light state.
    pub sunlight: SunlightState,
}

impl<'a> Env<'a> {
    /// Bundle collaborators for tick `now`.
    pub const fn new(
        world: &'a mut dyn World,
        dice: &'a mut dyn Dice,
        now: u64,
        sunlight: SunlightState,
    ) -> Self {
        Self {
            world,
            dice,
            now,
            sunlight,
        }
    }
}
