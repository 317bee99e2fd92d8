//! Headless engine binary for the colony management engine.
//!
//! Wires a sandbox world, one colony driven by the scripted controller and
//! the global tick loop together, then runs for the configured number of
//! ticks.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `colony-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the world clock from the world config
//! 4. Lay out the sandbox world and the colony
//! 5. Assemble the simulation
//! 6. Run the tick loop
//! 7. Log the result

mod error;
mod setup;
mod summary;

use std::path::Path;

use colony_core::clock::WorldClock;
use colony_core::config::SimulationConfig;
use colony_core::dice::SeededDice;
use colony_core::{AutoControl, Simulation};
use colony_types::ResourceKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::summary::SummaryLogger;

const CONFIG_PATH: &str = "colony-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the tick loop fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so whether a file was
    //    found is reported once the subscriber is up.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("colony-engine starting");
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        ticks = config.world.ticks,
        from_file,
        "Configuration loaded"
    );

    // 3. Create world clock.
    let clock = WorldClock::new(&config.world).map_err(EngineError::from)?;
    info!(
        day_length = config.world.day_length,
        night_length = config.world.night_length,
        "World clock initialized"
    );

    // 4. Lay out the sandbox.
    let mut dice = SeededDice::new(config.world.seed);
    let sandbox = setup::build(&config, &mut dice)?;
    let colony_name = sandbox.colony.name().to_owned();
    info!(
        colony = colony_name,
        width = config.sandbox.width,
        height = config.sandbox.height,
        trees = sandbox.trees,
        raiders = sandbox.raiders,
        "Sandbox created"
    );

    // 5. Assemble the simulation.
    let mut sim = Simulation::new(clock, sandbox.world, Box::new(dice));
    let colony_id = sim.add_colony(sandbox.colony, Box::new(AutoControl::new()));
    info!(colony = %colony_id, "Simulation assembled, entering tick loop");

    // 6. Run the tick loop.
    let mut logger = SummaryLogger::new(config.logging.summary_interval_ticks);
    sim.run(config.world.ticks, &mut logger)
        .map_err(EngineError::from)?;

    // 7. Log results.
    for colony in sim.colonies() {
        let stats = colony.population_stats();
        info!(
            colony = colony.name(),
            members = stats.members,
            fighters = stats.fighters,
            workers = stats.workers,
            prisoners = stats.prisoners,
            conquered = colony.is_conquered(),
            points = colony.points(),
            kills = colony.kills().len(),
            wood = colony.num_resource(ResourceKind::Wood, sim.world()),
            gold = colony.num_resource(ResourceKind::Gold, sim.world()),
            "Colony final state"
        );
    }
    info!(
        total_ticks = sim.clock().tick(),
        steps = logger.steps(),
        events = logger.events(),
        notices = logger.notices(),
        funded = logger.funded(),
        escaped = logger.escaped(),
        "colony-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from `colony-config.yaml`.
///
/// Looks for the file relative to the current working directory and falls
/// back to the defaults when it is missing. The flag tells whether a file
/// was read.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok((config, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}
