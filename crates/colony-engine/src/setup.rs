//! Sandbox layout for headless runs.
//!
//! The colony starts in the top-left corner of the map with a square of
//! claimed territory. Row 0 holds the stockpile, the armory and the
//! treasury; the far row holds a training dummy, two beds and a guard
//! post. A workshop and a third bed are planned but not yet built, and a
//! batch of wooden clubs is queued. Trees are scattered outside the
//! territory and marked for cutting; raiders wait just past the border.

use colony_agents::TraitSet;
use colony_core::Colony;
use colony_core::config::{SandboxConfig, SimulationConfig};
use colony_core::sandbox::{Body, SandboxWorld};
use colony_core::world::{Env, World};
use colony_types::{
    AgentId, Dice, FurnitureKind, FurnitureLayer, Item, MinionTrait, Position, ResourceKind,
    SunlightState, TribeId, WorkshopKind, ZoneKind,
};
use tracing::{debug, info};

use crate::error::EngineError;

/// Tribe of the sandbox colony.
pub const COLONY_TRIBE: TribeId = TribeId(1);

/// Smallest territory side the layout fits in.
pub const MIN_TERRITORY: u32 = 6;

/// Workshop option producing wooden clubs.
const WOODEN_CLUB: usize = 4;

/// Placement attempts per tree before giving up on it.
const TREE_ATTEMPTS: u32 = 8;

const NAME_POOL: &[&str] = &[
    "Grak", "Mog", "Snit", "Bolg", "Urza", "Krell", "Nib", "Dursh", "Ozzo", "Vek", "Hesk",
    "Thrag", "Zub", "Lurtz", "Grisha", "Pog", "Skarn", "Murl", "Gitz", "Brakka",
];

/// The sandbox world and its colony, ready for a simulation.
pub struct Sandbox {
    /// The world.
    pub world: SandboxWorld,
    /// The colony living in it.
    pub colony: Colony,
    /// Trees placed and marked for cutting.
    pub trees: u32,
    /// Raiders placed past the border.
    pub raiders: u32,
}

/// Lay out the world and the colony described by `config`.
///
/// # Errors
///
/// [`EngineError::Setup`] when the territory does not fit the layout,
/// [`EngineError::Colony`] when a colony operation rejects the layout.
pub fn build(config: &SimulationConfig, dice: &mut dyn Dice) -> Result<Sandbox, EngineError> {
    let layout = &config.sandbox;
    let side = layout.territory_size.min(layout.width).min(layout.height);
    if side < MIN_TERRITORY {
        return Err(EngineError::Setup {
            message: format!(
                "territory side {side} is below the minimum of {MIN_TERRITORY} squares"
            ),
        });
    }
    let far = coord(side.saturating_sub(1))?;
    let stockpile = Position::new(0, 0, 0);
    let armory = Position::new(0, 1, 0);
    let treasury = Position::new(0, far, 0);
    let guard_post = Position::new(0, far, far);
    let planned_row = far.saturating_sub(2);

    let mut world = SandboxWorld::new(layout.width, layout.height);
    let built = [
        (treasury, FurnitureKind::TreasureChest),
        (Position::new(0, 1, far), FurnitureKind::TrainingDummy),
        (Position::new(0, 2, far), FurnitureKind::Bed),
        (Position::new(0, 3, far), FurnitureKind::Bed),
    ];
    for (pos, kind) in built {
        world.set_furniture(pos, FurnitureLayer::Middle, Some(kind));
    }

    let mut colony = Colony::new(COLONY_TRIBE, config.colony.clone());
    for x in 0..side {
        for y in 0..side {
            colony.claim_square(Position::new(0, coord(x)?, coord(y)?), &world);
        }
    }
    for x in 0..layout.width {
        for y in 0..layout.height {
            colony.add_known_tile(Position::new(0, coord(x)?, coord(y)?));
        }
    }
    colony.set_zone(stockpile, ZoneKind::StorageResources);
    colony.set_zone(armory, ZoneKind::StorageEquipment);
    colony.set_zone(guard_post, ZoneKind::Guard);

    for _ in 0..layout.wood {
        world.put_item(stockpile, Item::resource(ResourceKind::Wood));
    }
    for _ in 0..layout.gold {
        world.put_item(treasury, Item::resource(ResourceKind::Gold));
    }

    for (x, kind) in [(1, FurnitureKind::Workshop), (3, FurnitureKind::Bed)] {
        let pos = Position::new(0, x, planned_row);
        if !colony.add_furniture(pos, kind, false, &world)? {
            debug!(%pos, ?kind, "furniture could not be planned");
        }
    }
    colony.queue_production(WorkshopKind::Workshop, WOODEN_CLUB)?;

    let trees = plant_trees(&mut world, &mut colony, layout, side, dice)?;
    let raiders = place_raiders(&mut world, layout, side, dice)?;
    let recruits = spawn_population(&mut world, layout, side, dice)?;

    let mut env = Env::new(&mut world, &mut *dice, 0, SunlightState::Day);
    for (agent, traits) in recruits {
        colony.add_member(agent, traits, &mut env)?;
    }

    info!(
        side,
        members = colony.roster().len(),
        trees,
        raiders,
        "sandbox laid out"
    );
    Ok(Sandbox {
        world,
        colony,
        trees,
        raiders,
    })
}

fn coord(value: u32) -> Result<i32, EngineError> {
    i32::try_from(value).map_err(|_| EngineError::Setup {
        message: format!("coordinate {value} does not fit the map"),
    })
}

fn pick_name(dice: &mut dyn Dice) -> &'static str {
    dice.choose_index(NAME_POOL.len())
        .and_then(|i| NAME_POOL.get(i))
        .copied()
        .unwrap_or("Minion")
}

/// Scatter trees outside the territory and order them cut.
fn plant_trees(
    world: &mut SandboxWorld,
    colony: &mut Colony,
    layout: &SandboxConfig,
    side: u32,
    dice: &mut dyn Dice,
) -> Result<u32, EngineError> {
    let mut planted = 0_u32;
    for _ in 0..layout.trees {
        for _ in 0..TREE_ATTEMPTS {
            let (x, y) = (dice.roll(layout.width), dice.roll(layout.height));
            if x < side && y < side {
                continue;
            }
            let pos = Position::new(0, coord(x)?, coord(y)?);
            if world.furniture_at(pos, FurnitureLayer::Middle).is_some() {
                continue;
            }
            world.set_furniture(pos, FurnitureLayer::Middle, Some(FurnitureKind::Tree));
            colony.order_destruction(pos, &*world)?;
            planted = planted.saturating_add(1);
            break;
        }
    }
    Ok(planted)
}

/// Put hostile raiders in the column just past the border.
fn place_raiders(
    world: &mut SandboxWorld,
    layout: &SandboxConfig,
    side: u32,
    dice: &mut dyn Dice,
) -> Result<u32, EngineError> {
    if layout.raiders == 0 {
        return Ok(0);
    }
    if side >= layout.width {
        debug!("no room past the border, raiders skipped");
        return Ok(0);
    }
    let x = coord(side)?;
    let mut placed = 0_u32;
    for i in 0..layout.raiders {
        let y = coord(i.checked_rem(layout.height).unwrap_or(0))?;
        let body = Body::new(pick_name(dice), "goblin")
            .humanoid()
            .tribe(TribeId::MONSTER)
            .difficulty(20)
            .at(Position::new(0, x, y));
        world.spawn(body);
        placed = placed.saturating_add(1);
    }
    Ok(placed)
}

/// Spawn the starting population on rows 1 and 2 of the territory: one
/// leader, then fighters, workers and prisoners.
fn spawn_population(
    world: &mut SandboxWorld,
    layout: &SandboxConfig,
    side: u32,
    dice: &mut dyn Dice,
) -> Result<Vec<(AgentId, TraitSet)>, EngineError> {
    let groups = [
        (1, "orc", MinionTrait::Leader),
        (layout.fighters, "orc", MinionTrait::Fighter),
        (layout.workers, "imp", MinionTrait::Worker),
        (layout.prisoners, "human", MinionTrait::Prisoner),
    ];
    let mut recruits = Vec::new();
    let mut slot = 0_u32;
    for (count, species, t) in groups {
        for _ in 0..count {
            let x = slot.checked_rem(side).unwrap_or(0);
            let row = slot.checked_div(side).unwrap_or(0).checked_rem(2).unwrap_or(0);
            let pos = Position::new(0, coord(x)?, coord(row.saturating_add(1))?);
            let agent = world.spawn(Body::new(pick_name(dice), species).humanoid().at(pos));
            recruits.push((agent, TraitSet::of(&[t])));
            slot = slot.saturating_add(1);
        }
    }
    Ok(recruits)
}
