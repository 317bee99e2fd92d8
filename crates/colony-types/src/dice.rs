//! Randomness seam.
//!
//! Every probabilistic decision in the colony (rebellion, torture outcome,
//! storage choice, periodic passes) goes through [`Dice`] so that callers
//! can substitute a seeded or scripted source.

/// Source of random decisions.
pub trait Dice {
    /// Uniform integer in `[0, n)`. Returns 0 when `n` is 0.
    fn roll(&mut self, n: u32) -> u32;

    /// `true` with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool;

    /// `true` with probability `1 / n`.
    fn one_in(&mut self, n: u32) -> bool {
        self.roll(n) == 0
    }

    /// Uniform index into a collection of `len` elements.
    fn choose_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let bound = u32::try_from(len).unwrap_or(u32::MAX);
        usize::try_from(self.roll(bound)).ok()
    }
}
