//! Captures, deaths, conquest, torture and prisoner rebellions across a
//! whole simulation step.

#![allow(clippy::unwrap_used)]

use colony_agents::{AgentService, TraitSet};
use colony_core::clock::WorldClock;
use colony_core::config::ColonyConfig;
use colony_core::control::PassiveControl;
use colony_core::dice::ScriptedDice;
use colony_core::immigration::OfferKind;
use colony_core::sandbox::{Body, SandboxWorld};
use colony_core::world::{Env, World};
use colony_core::{Colony, GameEvent, Simulation};
use colony_types::{
    AgentId, ColonyId, CreatureStatus, LastingEffect, MinionTrait, Position, SunlightState,
    TribeId,
};

const HOME: Position = Position::new(0, 1, 1);

fn named(name: &str, tribe: u32) -> Colony {
    Colony::new(
        TribeId(tribe),
        ColonyConfig {
            name: name.to_owned(),
            ..ColonyConfig::default()
        },
    )
}

fn simulation() -> Simulation<SandboxWorld> {
    Simulation::new(
        WorldClock::from_parts(0, 10, 5).unwrap(),
        SandboxWorld::new(10, 10),
        Box::new(ScriptedDice::new()),
    )
}

fn recruit(
    sim: &mut Simulation<SandboxWorld>,
    colony: ColonyId,
    name: &str,
    traits: &[MinionTrait],
) -> AgentId {
    let agent = sim
        .world_mut()
        .spawn(Body::new(name, "orc").humanoid().at(HOME));
    let traits = TraitSet::of(traits);
    sim.with_colony(colony, |c, env| c.add_member(agent, traits, env))
        .unwrap();
    agent
}

#[test]
fn losing_the_last_leader_conquers_once() {
    let mut sim = simulation();
    let keep = sim.add_colony(named("Keep", 1), Box::new(PassiveControl));
    let rival = sim.add_colony(named("Rival", 2), Box::new(PassiveControl));
    let chief = recruit(&mut sim, keep, "Chief", &[MinionTrait::Leader]);

    sim.world_mut().kill(chief, None);
    let report = sim.step().unwrap();
    // The death, then the conquest.
    assert_eq!(report.events, 2);
    assert!(sim.colony(keep).unwrap().is_conquered());
    assert!(!sim.colony(rival).unwrap().is_conquered());
    let rival_memory = sim.colony(rival).unwrap().recorded_events();
    assert!(rival_memory.contains("the conquering of Keep"));

    // A later recruit falling does not announce it again.
    let guard = recruit(&mut sim, keep, "Guard", &[MinionTrait::Fighter]);
    sim.world_mut().kill(guard, None);
    let report = sim.step().unwrap();
    assert_eq!(report.events, 1);
    assert!(sim.colony(keep).unwrap().is_conquered());
}

#[test]
fn capturing_the_only_fighting_leader_conquers_once() {
    let mut sim = simulation();
    let keep = sim.add_colony(named("Keep", 1), Box::new(PassiveControl));
    let rival = sim.add_colony(named("Rival", 2), Box::new(PassiveControl));
    let chief = recruit(&mut sim, keep, "Chief", &[MinionTrait::Leader, MinionTrait::Fighter]);
    recruit(&mut sim, keep, "Digger", &[MinionTrait::Worker]);
    let before = sim.colony(keep).unwrap().population_stats();
    assert_eq!(before.fighters, 1);
    assert_eq!(before.leaders, 1);

    sim.world_mut().stun(chief, None);
    let report = sim.step().unwrap();
    // The capture, then the conquest.
    assert_eq!(report.events, 2);
    let colony = sim.colony(keep).unwrap();
    assert!(colony.roster().contains(chief));
    assert!(!colony.roster().has_trait(chief, MinionTrait::Fighter));
    assert!(!colony.roster().has_trait(chief, MinionTrait::Leader));
    let after = colony.population_stats();
    assert_eq!(after.fighters, 0);
    assert_eq!(after.leaders, 0);
    assert!(colony.is_conquered());
    assert!(sim
        .colony(rival)
        .unwrap()
        .recorded_events()
        .contains("the conquering of Keep"));

    let report = sim.step().unwrap();
    assert_eq!(report.events, 0);
}

#[test]
fn a_stunned_fighter_loses_its_status() {
    let mut sim = simulation();
    let keep = sim.add_colony(named("Keep", 1), Box::new(PassiveControl));
    let chief = recruit(&mut sim, keep, "Chief", &[MinionTrait::Leader]);
    let grunt = recruit(&mut sim, keep, "Grunt", &[MinionTrait::Fighter]);
    let roster = sim.colony(keep).unwrap().roster();
    assert!(roster.has_status(chief, CreatureStatus::Leader));
    assert!(roster.has_status(chief, CreatureStatus::Fighter));
    assert!(!roster.has_status(chief, CreatureStatus::Civilian));

    sim.world_mut().stun(grunt, None);
    sim.step().unwrap();
    let colony = sim.colony(keep).unwrap();
    assert!(colony.roster().contains(grunt));
    assert!(!colony.roster().has_trait(grunt, MinionTrait::Fighter));
    // Unconscious and no longer a fighter: no status at all.
    assert!(colony.roster().status_of(grunt).is_empty());
    assert!(!colony.is_conquered());
    assert!(colony.recorded_events().contains("the capturing of Grunt"));
}

#[test]
fn stunning_an_outsider_offers_a_captive() {
    let mut sim = simulation();
    let keep = sim.add_colony(named("Keep", 1), Box::new(PassiveControl));
    let grunt = recruit(&mut sim, keep, "Grunt", &[MinionTrait::Fighter]);
    let stranger = sim
        .world_mut()
        .spawn(Body::new("Stranger", "human").humanoid().at(HOME));
    sim.world_mut().stun(stranger, Some(grunt));
    sim.step().unwrap();
    let colony = sim.colony(keep).unwrap();
    assert!(!colony.roster().contains(stranger));
    let offers = colony.immigration().offers();
    assert_eq!(offers.len(), 1);
    assert!(offers
        .first()
        .is_some_and(|o| o.agent == stranger && o.kind == OfferKind::Captive));
}

fn prison(world: &mut SandboxWorld, prisoners: usize, fighters: usize) -> (Colony, Vec<AgentId>) {
    let mut colony = named("Keep", 1);
    let mut dice = ScriptedDice::new();
    let mut captured = Vec::new();
    for _ in 0..prisoners {
        let agent = world.spawn(Body::new("Captive", "goblin").humanoid().at(HOME));
        let mut env = Env::new(world, &mut dice, 1, SunlightState::Day);
        colony
            .add_member(agent, TraitSet::of(&[MinionTrait::Prisoner]), &mut env)
            .unwrap();
        captured.push(agent);
    }
    for _ in 0..fighters {
        let agent = world.spawn(Body::new("Guard", "orc").humanoid().at(HOME));
        let mut env = Env::new(world, &mut dice, 1, SunlightState::Day);
        colony
            .add_member(agent, TraitSet::of(&[MinionTrait::Fighter]), &mut env)
            .unwrap();
    }
    (colony, captured)
}

#[test]
fn enough_guards_keep_prisoners_in() {
    let mut world = SandboxWorld::new(10, 10);
    let (mut colony, prisoners) = prison(&mut world, 5, 2);
    let mut dice = ScriptedDice::new().default_chance(true);
    let mut env = Env::new(&mut world, &mut dice, 2, SunlightState::Day);
    let summary = colony.tick(&mut env).unwrap();
    assert_eq!(summary.escaped, 0);
    assert_eq!(summary.stats.prisoners, 5);
    assert!(prisoners.iter().all(|p| colony.roster().contains(*p)));
}

#[test]
fn torture_can_convert_a_prisoner() {
    let mut world = SandboxWorld::new(10, 10);
    let (mut colony, prisoners) = prison(&mut world, 1, 1);
    let victim = *prisoners.first().unwrap();
    let torturer = *colony.roster().with_trait(MinionTrait::Fighter).first().unwrap();
    world.add_effect(victim, LastingEffect::TiedUp, None);

    // The session ends, and not in death.
    let mut dice = ScriptedDice::new().with_rolls(&[0, 1]);
    let mut env = Env::new(&mut world, &mut dice, 3, SunlightState::Day);
    colony
        .on_event(&GameEvent::CreatureTortured { victim, torturer }, &mut env)
        .unwrap();

    let roster = colony.roster();
    assert!(roster.has_trait(victim, MinionTrait::Fighter));
    assert!(!roster.has_trait(victim, MinionTrait::Prisoner));
    assert!(roster.has_status(victim, CreatureStatus::Fighter));
    assert!(!env.world.has_effect(victim, LastingEffect::TiedUp));
    assert!(colony.recorded_events().contains("the torturing of Captive"));
}

#[test]
fn torture_can_kill_a_prisoner() {
    let mut world = SandboxWorld::new(10, 10);
    let (mut colony, prisoners) = prison(&mut world, 1, 1);
    let victim = *prisoners.first().unwrap();
    let torturer = *colony.roster().with_trait(MinionTrait::Fighter).first().unwrap();

    let mut dice = ScriptedDice::new().with_rolls(&[0, 0]);
    let mut env = Env::new(&mut world, &mut dice, 3, SunlightState::Day);
    colony
        .on_event(&GameEvent::CreatureTortured { victim, torturer }, &mut env)
        .unwrap();
    let events = env.world.drain_events();
    assert_eq!(
        events,
        vec![GameEvent::CreatureKilled {
            victim,
            attacker: None
        }]
    );
    for event in &events {
        colony.on_event(event, &mut env).unwrap();
    }
    assert!(!colony.roster().contains(victim));
    assert!(!env.world.exists(victim));
}

#[test]
fn an_ordinary_torture_session_changes_nothing() {
    let mut world = SandboxWorld::new(10, 10);
    let (mut colony, prisoners) = prison(&mut world, 1, 1);
    let victim = *prisoners.first().unwrap();
    let torturer = *colony.roster().with_trait(MinionTrait::Fighter).first().unwrap();

    let mut dice = ScriptedDice::new();
    let mut env = Env::new(&mut world, &mut dice, 3, SunlightState::Day);
    colony
        .on_event(&GameEvent::CreatureTortured { victim, torturer }, &mut env)
        .unwrap();
    assert!(colony.roster().has_trait(victim, MinionTrait::Prisoner));
    assert!(env.world.drain_events().is_empty());
}
