//! Resource flows through construction plans, refunds and freed workers.

#![allow(clippy::unwrap_used)]

use colony_agents::TraitSet;
use colony_core::Colony;
use colony_core::config::ColonyConfig;
use colony_core::control::Notice;
use colony_core::dice::ScriptedDice;
use colony_core::sandbox::{Body, SandboxWorld};
use colony_core::world::{Env, World};
use colony_ledger::Bucket;
use colony_site::FurnitureCatalog;
use colony_types::{
    AgentId, CostInfo, FurnitureKind, FurnitureLayer, Item, MinionTrait, Position, ResourceKind,
    SunlightState, TribeId, ZoneKind,
};

const SPOT: Position = Position::new(0, 2, 2);
const STOCK: Position = Position::new(0, 0, 0);

fn claimed(colony: Colony, world: &SandboxWorld) -> Colony {
    let mut colony = colony;
    for x in 0..5 {
        for y in 0..5 {
            colony.claim_square(Position::new(0, x, y), world);
        }
    }
    colony
}

fn stocked(world: &mut SandboxWorld, wood: u32) -> Colony {
    let mut colony = claimed(Colony::new(TribeId(1), ColonyConfig::default()), world);
    colony.set_zone(STOCK, ZoneKind::StorageResources);
    for _ in 0..wood {
        world.put_item(STOCK, Item::resource(ResourceKind::Wood));
    }
    colony
}

fn hire(colony: &mut Colony, env: &mut Env<'_>, agent: AgentId) -> AgentId {
    colony
        .add_member(agent, TraitSet::of(&[MinionTrait::Worker]), env)
        .unwrap();
    agent
}

#[test]
fn gold_refund_without_a_chest_becomes_credit_and_funds_the_plan() {
    let mut world = SandboxWorld::new(10, 10);
    let mut catalog = FurnitureCatalog::standard();
    let mut door = catalog.info(FurnitureKind::Door).cloned().unwrap();
    door.cost = CostInfo::new(ResourceKind::Gold, 10);
    catalog.set(FurnitureKind::Door, door);
    let mut colony = claimed(
        Colony::new(TribeId(1), ColonyConfig::default()).with_furniture(catalog),
        &world,
    );

    assert!(colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap());
    assert_eq!(colony.debt(ResourceKind::Gold), 10);
    let cost = CostInfo::new(ResourceKind::Gold, 10);
    assert!(!colony.has_resource(&cost, &world));

    let mut dice = ScriptedDice::new();
    let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
    colony.return_resource(&cost, &mut env).unwrap();
    assert_eq!(colony.ledger().credit(ResourceKind::Gold), 10);
    assert_eq!(colony.available(ResourceKind::Gold, &*env.world), 0);

    let summary = colony.tick(&mut env).unwrap();
    assert_eq!(summary.funded, 1);
    assert_eq!(colony.ledger().credit(ResourceKind::Gold), 0);
    assert_eq!(colony.debt(ResourceKind::Gold), 0);
}

#[test]
fn a_door_is_paid_from_storage_and_built() {
    let mut world = SandboxWorld::new(10, 10);
    let mut colony = stocked(&mut world, 5);
    let body = world.spawn(Body::new("Imp", "imp").humanoid().at(Position::new(0, 1, 1)));
    assert_eq!(colony.num_resource(ResourceKind::Wood, &world), 5);
    assert!(colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap());
    assert_eq!(colony.available(ResourceKind::Wood, &world), 0);

    let mut dice = ScriptedDice::new();
    let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
    let imp = hire(&mut colony, &mut env, body);
    let summary = colony.tick(&mut env).unwrap();
    assert_eq!(summary.funded, 1);
    assert_eq!(colony.num_resource(ResourceKind::Wood, &*env.world), 0);

    let task = colony
        .constructions()
        .furniture(SPOT, FurnitureLayer::Middle)
        .unwrap()
        .task()
        .unwrap();
    colony.claim_task(imp, task).unwrap();
    colony.complete_task(imp, task, &mut env).unwrap();

    assert_eq!(
        env.world.furniture_at(SPOT, FurnitureLayer::Middle),
        Some(FurnitureKind::Door)
    );
    assert!(colony
        .constructions()
        .furniture(SPOT, FurnitureLayer::Middle)
        .unwrap()
        .is_built());
    assert!(colony.drain_notices().iter().any(|n| matches!(
        n,
        Notice::Constructed { kind: FurnitureKind::Door, .. }
    )));
    assert_eq!(colony.ledger().audit().net_flow(ResourceKind::Wood), -5);
    assert_eq!(colony.debt(ResourceKind::Wood), 0);
}

#[test]
fn removing_a_funded_plan_refunds_exactly_once() {
    let mut world = SandboxWorld::new(10, 10);
    let mut colony = stocked(&mut world, 5);
    colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap();

    let mut dice = ScriptedDice::new();
    let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
    colony.tick(&mut env).unwrap();
    assert_eq!(colony.num_resource(ResourceKind::Wood, &*env.world), 0);

    assert!(colony
        .remove_unbuilt_furniture(SPOT, FurnitureLayer::Middle, &mut env)
        .unwrap());
    assert!(!colony
        .remove_unbuilt_furniture(SPOT, FurnitureLayer::Middle, &mut env)
        .unwrap());

    assert_eq!(world.total_resource(ResourceKind::Wood), 5);
    assert_eq!(colony.ledger().credit(ResourceKind::Wood), 0);
    let audit = colony.ledger().audit();
    assert_eq!(audit.net_flow(ResourceKind::Wood), 0);
    assert_eq!(audit.net_flow_in(ResourceKind::Wood, Bucket::Credit), 0);
}

#[test]
fn freeing_a_builder_cancels_and_refunds_once() {
    let mut world = SandboxWorld::new(10, 10);
    let mut colony = stocked(&mut world, 5);
    let body = world.spawn(Body::new("Imp", "imp").humanoid().at(Position::new(0, 1, 1)));
    colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap();

    let mut dice = ScriptedDice::new();
    let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
    let imp = hire(&mut colony, &mut env, body);
    colony.tick(&mut env).unwrap();
    let task = colony
        .constructions()
        .furniture(SPOT, FurnitureLayer::Middle)
        .unwrap()
        .task()
        .unwrap();
    colony.claim_task(imp, task).unwrap();

    let refunded = colony.free_from_task(imp, &mut env).unwrap();
    assert_eq!(refunded, CostInfo::new(ResourceKind::Wood, 5));
    assert!(colony.free_from_task(imp, &mut env).unwrap().is_free());
    assert_eq!(colony.num_resource(ResourceKind::Wood, &*env.world), 5);
    assert!(colony.tasks().task(task).is_none());

    // The plan is still there and gets funded again.
    let summary = colony.tick(&mut env).unwrap();
    assert_eq!(summary.funded, 1);
    assert_eq!(colony.num_resource(ResourceKind::Wood, &*env.world), 0);
}

#[test]
fn a_member_leaving_mid_task_refunds_its_stone_once() {
    let mut world = SandboxWorld::new(10, 10);
    let mut catalog = FurnitureCatalog::standard();
    let mut door = catalog.info(FurnitureKind::Door).cloned().unwrap();
    door.cost = CostInfo::new(ResourceKind::Stone, 3);
    catalog.set(FurnitureKind::Door, door);
    let mut colony = claimed(
        Colony::new(TribeId(1), ColonyConfig::default()).with_furniture(catalog),
        &world,
    );
    colony.add_credit(ResourceKind::Stone, 3);
    let body = world.spawn(Body::new("Imp", "imp").humanoid().at(Position::new(0, 1, 1)));
    colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap();

    let mut dice = ScriptedDice::new();
    let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
    let imp = hire(&mut colony, &mut env, body);
    assert_eq!(colony.tick(&mut env).unwrap().funded, 1);
    assert_eq!(colony.num_resource(ResourceKind::Stone, &*env.world), 0);
    let task = colony
        .constructions()
        .furniture(SPOT, FurnitureLayer::Middle)
        .unwrap()
        .task()
        .unwrap();
    colony.claim_task(imp, task).unwrap();

    assert!(colony.remove_member(imp, &mut env).unwrap());
    assert!(!colony.roster().contains(imp));
    assert!(colony.tasks().task(task).is_none());
    assert_eq!(colony.num_resource(ResourceKind::Stone, &*env.world), 3);

    assert!(!colony.remove_member(imp, &mut env).unwrap());
    assert_eq!(colony.num_resource(ResourceKind::Stone, &*env.world), 3);
}

#[test]
fn plans_the_world_no_longer_supports_are_dropped_with_a_refund() {
    let mut world = SandboxWorld::new(10, 10);
    let mut colony = stocked(&mut world, 5);
    colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap();
    {
        let mut dice = ScriptedDice::new();
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        colony.tick(&mut env).unwrap();
    }
    world.block(SPOT);

    let mut dice = ScriptedDice::new();
    let mut env = Env::new(&mut world, &mut dice, 2, SunlightState::Day);
    colony.tick(&mut env).unwrap();
    assert!(!colony
        .constructions()
        .contains_furniture(SPOT, FurnitureLayer::Middle));
    assert_eq!(colony.num_resource(ResourceKind::Wood, &*env.world), 5);
    assert_eq!(colony.debt(ResourceKind::Wood), 0);
}

#[test]
fn one_plan_per_square_and_layer() {
    let world = SandboxWorld::new(10, 10);
    let mut colony = claimed(Colony::new(TribeId(1), ColonyConfig::default()), &world);
    assert!(colony.add_furniture(SPOT, FurnitureKind::Bed, false, &world).unwrap());
    assert!(!colony.add_furniture(SPOT, FurnitureKind::Door, false, &world).unwrap());
    assert!(!colony.add_furniture(SPOT, FurnitureKind::Bed, true, &world).unwrap());
    assert_eq!(colony.debt(ResourceKind::Wood), 6);
}
