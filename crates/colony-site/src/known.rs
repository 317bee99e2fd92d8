//! Squares the colony has discovered.

use std::collections::BTreeSet;

use colony_types::Position;

/// Discovered squares.
#[derive(Debug, Clone, Default)]
pub struct KnownTiles {
    known: BTreeSet<Position>,
}

impl KnownTiles {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self {
            known: BTreeSet::new(),
        }
    }

    /// Mark `pos` known. Returns `true` if it was unknown before.
    pub fn add_tile(&mut self, pos: Position) -> bool {
        self.known.insert(pos)
    }

    /// Whether `pos` is known.
    pub fn is_known(&self, pos: Position) -> bool {
        self.known.contains(&pos)
    }

    /// Forget every tile outside `level`.
    pub fn limit_to_level(&mut self, level: u32) {
        self.known.retain(|pos| pos.level == level);
    }

    /// Known tiles plus their immediate neighbours.
    pub fn with_margin(&self) -> BTreeSet<Position> {
        let mut ret = self.known.clone();
        for pos in &self.known {
            ret.extend(pos.neighbors8());
        }
        ret
    }

    /// Number of known tiles.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Whether nothing is known.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_novelty() {
        let mut k = KnownTiles::new();
        assert!(k.add_tile(Position::new(0, 0, 0)));
        assert!(!k.add_tile(Position::new(0, 0, 0)));
    }

    #[test]
    fn limit_to_level_drops_other_levels() {
        let mut k = KnownTiles::new();
        k.add_tile(Position::new(0, 0, 0));
        k.add_tile(Position::new(1, 0, 0));
        k.limit_to_level(1);
        assert!(!k.is_known(Position::new(0, 0, 0)));
        assert!(k.is_known(Position::new(1, 0, 0)));
        assert_eq!(k.with_margin().len(), 9);
    }
}
