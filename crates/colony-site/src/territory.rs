//! The set of squares a colony has claimed.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use colony_types::Position;

/// Claimed squares with a lazily computed border.
#[derive(Debug, Clone, Default)]
pub struct Territory {
    squares: BTreeSet<Position>,
    border: Option<Vec<Position>>,
}

impl Territory {
    /// Create an empty territory.
    pub const fn new() -> Self {
        Self {
            squares: BTreeSet::new(),
            border: None,
        }
    }

    /// Claim a square. Returns `true` if it was not claimed before.
    pub fn insert(&mut self, pos: Position) -> bool {
        let added = self.squares.insert(pos);
        if added {
            self.border = None;
        }
        added
    }

    /// Release a square. Returns `true` if it was claimed.
    pub fn remove(&mut self, pos: Position) -> bool {
        let removed = self.squares.remove(&pos);
        if removed {
            self.border = None;
        }
        removed
    }

    /// Whether `pos` is claimed.
    pub fn contains(&self, pos: Position) -> bool {
        self.squares.contains(&pos)
    }

    /// All claimed squares in position order.
    pub const fn all(&self) -> &BTreeSet<Position> {
        &self.squares
    }

    /// Number of claimed squares.
    pub fn len(&self) -> usize {
        self.squares.len()
    }

    /// Whether nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Recompute the border if the territory changed since the last call.
    /// Returns `true` when work was done.
    pub fn refresh_border(&mut self) -> bool {
        if self.border.is_some() {
            return false;
        }
        let border = self
            .squares
            .iter()
            .filter(|pos| pos.neighbors8().iter().any(|n| !self.squares.contains(n)))
            .copied()
            .collect();
        self.border = Some(border);
        true
    }

    /// Claimed squares adjacent to an unclaimed one, as of the last refresh.
    pub fn border(&self) -> &[Position] {
        self.border.as_deref().unwrap_or(&[])
    }

    /// Squares within `radius` steps (8-neighbourhood) of the territory,
    /// excluding the territory itself.
    pub fn extended(&self, radius: u32) -> Vec<Position> {
        let mut dist: BTreeMap<Position, u32> = BTreeMap::new();
        let mut queue = VecDeque::new();
        for pos in &self.squares {
            dist.insert(*pos, 0);
            queue.push_back(*pos);
        }
        let mut ret = Vec::new();
        while let Some(pos) = queue.pop_front() {
            let d = dist.get(&pos).copied().unwrap_or(0);
            if d >= radius {
                continue;
            }
            for n in pos.neighbors8() {
                if !dist.contains_key(&n) {
                    dist.insert(n, d.saturating_add(1));
                    queue.push_back(n);
                    ret.push(n);
                }
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: i32) -> Territory {
        let mut t = Territory::new();
        for x in 0..size {
            for y in 0..size {
                t.insert(Position::new(0, x, y));
            }
        }
        t
    }

    #[test]
    fn border_excludes_interior() {
        let mut t = square(3);
        assert!(t.refresh_border());
        assert_eq!(t.border().len(), 8);
        assert!(!t.border().contains(&Position::new(0, 1, 1)));
        assert!(!t.refresh_border());
    }

    #[test]
    fn border_is_invalidated_on_change() {
        let mut t = square(3);
        t.refresh_border();
        t.remove(Position::new(0, 0, 0));
        assert!(t.border().is_empty());
        assert!(t.refresh_border());
        // The centre now touches the released corner.
        assert_eq!(t.border().len(), 8);
        assert!(t.border().contains(&Position::new(0, 1, 1)));
    }

    #[test]
    fn extended_ring_has_expected_size() {
        let t = square(1);
        assert_eq!(t.extended(1).len(), 8);
        assert_eq!(t.extended(2).len(), 24);
        assert!(!t.extended(2).contains(&Position::new(0, 0, 0)));
    }
}
