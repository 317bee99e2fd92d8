//! World clock and light cycle.
//!
//! The tick counter is the only stored temporal state. The light cycle is
//! derived from it: each cycle is `day_length` ticks of daylight followed
//! by `night_length` ticks of darkness.
//!
//! All derivations use checked arithmetic.

use colony_types::SunlightState;

use crate::config::WorldConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration (e.g. a zero-length day).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Tick counter plus light cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    /// Current tick (0 before the first tick runs).
    tick: u64,

    /// Daylight ticks per cycle.
    day_length: u64,

    /// Darkness ticks per cycle.
    night_length: u64,
}

impl WorldClock {
    /// Create a clock at tick 0 from the world configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the day length is 0.
    pub fn new(config: &WorldConfig) -> Result<Self, ClockError> {
        Self::from_parts(0, config.day_length, config.night_length)
    }

    /// Create a clock from explicit parameters (tests, restored state).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `day_length` is 0.
    pub fn from_parts(tick: u64, day_length: u64, night_length: u64) -> Result<Self, ClockError> {
        if day_length == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "day_length must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            tick,
            day_length,
            night_length,
        })
    }

    /// Advance by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] past `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Current tick.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Light state at the current tick.
    pub const fn sunlight(&self) -> SunlightState {
        let cycle = self.day_length.saturating_add(self.night_length);
        let phase = match self.tick.checked_rem(cycle) {
            Some(p) => p,
            None => 0,
        };
        if phase < self.day_length {
            SunlightState::Day
        } else {
            SunlightState::Night
        }
    }
}
