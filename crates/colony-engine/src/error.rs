//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and of the tick
//! loop so that `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: colony_core::config::ConfigError,
    },

    /// World clock initialization failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: colony_core::clock::ClockError,
    },

    /// A colony operation failed during setup.
    #[error("colony error: {source}")]
    Colony {
        /// The underlying colony error.
        #[from]
        source: colony_core::ColonyError,
    },

    /// The tick loop stopped.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: colony_core::SimulationError,
    },

    /// The sandbox layout does not fit the map.
    #[error("setup error: {message}")]
    Setup {
        /// Description of the layout problem.
        message: String,
    },
}
