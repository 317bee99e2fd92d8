//! [`Dice`] implementations.
//!
//! - [`SeededDice`] wraps a seeded [`StdRng`] so that a run is reproducible
//!   from the configured world seed.
//! - [`ScriptedDice`] replays fixed outcomes, for tests that need to force
//!   a rebellion, a conversion or a storage choice.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use colony_types::Dice;

/// Pseudo-random dice seeded from the world seed.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    /// Create dice from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.random_range(0..n)
    }

    fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.rng.random_bool(p)
    }
}

/// Dice that replay queued outcomes, then fall back to fixed defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
    chances: VecDeque<bool>,
    default_roll: u32,
    default_chance: bool,
}

impl ScriptedDice {
    /// Dice that roll 1 ("one in n" never fires, so periodic passes are
    /// skipped) and never pass an uncertain chance.
    pub const fn new() -> Self {
        Self {
            rolls: VecDeque::new(),
            chances: VecDeque::new(),
            default_roll: 1,
            default_chance: false,
        }
    }

    /// Queue roll outcomes. Each is clamped below the requested bound.
    #[must_use]
    pub fn with_rolls(mut self, rolls: &[u32]) -> Self {
        self.rolls.extend(rolls.iter().copied());
        self
    }

    /// Queue chance outcomes.
    #[must_use]
    pub fn with_chances(mut self, chances: &[bool]) -> Self {
        self.chances.extend(chances.iter().copied());
        self
    }

    /// Roll returned once the queue is empty.
    #[must_use]
    pub const fn default_roll(mut self, roll: u32) -> Self {
        self.default_roll = roll;
        self
    }

    /// Chance outcome once the queue is empty. Probabilities of exactly 0
    /// and 1 are always honoured.
    #[must_use]
    pub const fn default_chance(mut self, chance: bool) -> Self {
        self.default_chance = chance;
        self
    }

    /// Push one more roll outcome.
    pub fn push_roll(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    /// Push one more chance outcome.
    pub fn push_chance(&mut self, chance: bool) {
        self.chances.push_back(chance);
    }
}

impl Default for ScriptedDice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        let value = self.rolls.pop_front().unwrap_or(self.default_roll);
        value.min(n.saturating_sub(1))
    }

    fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.chances.pop_front().unwrap_or(self.default_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dice_are_reproducible() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        let xs: Vec<u32> = (0..20).map(|_| a.roll(100)).collect();
        let ys: Vec<u32> = (0..20).map(|_| b.roll(100)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| *x < 100));
    }

    #[test]
    fn certain_probabilities_are_honoured() {
        let mut seeded = SeededDice::new(7);
        let mut scripted = ScriptedDice::new().with_chances(&[true, true]);
        assert!(!seeded.chance(0.0));
        assert!(seeded.chance(1.0));
        assert!(!scripted.chance(0.0));
        assert!(scripted.chance(1.0));
        // The queue was not consumed by the certain calls.
        assert!(scripted.chance(0.5));
        assert!(scripted.chance(0.5));
        assert!(!scripted.chance(0.5));
    }

    #[test]
    fn scripted_rolls_are_clamped_then_default() {
        let mut dice = ScriptedDice::new().with_rolls(&[9, 0]).default_roll(3);
        assert_eq!(dice.roll(5), 4);
        assert_eq!(dice.roll(5), 0);
        assert_eq!(dice.roll(5), 3);
        assert_eq!(dice.roll(2), 1);
        assert_eq!(dice.roll(0), 0);
    }

    #[test]
    fn choose_index_uses_roll() {
        let mut dice = ScriptedDice::new().with_rolls(&[2]);
        assert_eq!(dice.choose_index(4), Some(2));
        assert_eq!(dice.choose_index(0), None);
    }
}
