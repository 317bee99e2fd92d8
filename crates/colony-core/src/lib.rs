//! Colony management engine.
//!
//! A colony owns a population of minions, assigns them to activities,
//! keeps a resource economy, schedules construction, hauling and
//! production tasks, and reacts to what happens in the world. This crate
//! ties the leaf crates together behind one context object, [`Colony`],
//! and drives it tick by tick.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and light cycle
//! - [`colony`] -- The colony context object, its tick driver, reactor
//!   and commands
//! - [`config`] -- YAML configuration
//! - [`control`] -- The controller seam and a scripted controller
//! - [`dice`] -- Seeded and scripted randomness
//! - [`error`] -- Colony error type
//! - [`event`] -- Game events and the event bus
//! - [`immigration`] -- Pending recruits and captives
//! - [`sandbox`] -- In-memory world for headless runs and tests
//! - [`simulation`] -- The global tick loop over several colonies
//! - [`world`] -- The world seam and the per-call environment

pub mod clock;
pub mod colony;
pub mod config;
pub mod control;
pub mod dice;
pub mod error;
pub mod event;
pub mod immigration;
pub mod sandbox;
pub mod simulation;
pub mod world;

pub use colony::{Colony, TickSummary};
pub use control::{AutoControl, ColonyControl, Notice, PassiveControl};
pub use error::ColonyError;
pub use event::{EventBus, GameEvent};
pub use simulation::{Simulation, SimulationError, StepReport};
pub use world::{Env, World};
