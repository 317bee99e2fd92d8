//! Plain data shared across the colony crates.
//!
//! Nothing here carries behaviour beyond small helpers; the owning crates
//! (`colony-ledger`, `colony-site`, `colony-core`) decide what the values
//! mean.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ItemClass, MessagePriority, FurnitureKind, ResourceKind};
use crate::ids::ItemId;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A square on one level of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Level (dungeon depth or map) the square belongs to.
    pub level: u32,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(level: u32, x: i32, y: i32) -> Self {
        Self { level, x, y }
    }

    /// The eight squares surrounding this one on the same level.
    pub const fn neighbors8(self) -> [Self; 8] {
        let (l, x, y) = (self.level, self.x, self.y);
        let (xm, xp) = (x.saturating_sub(1), x.saturating_add(1));
        let (ym, yp) = (y.saturating_sub(1), y.saturating_add(1));
        [
            Self::new(l, xm, ym),
            Self::new(l, x, ym),
            Self::new(l, xp, ym),
            Self::new(l, xm, y),
            Self::new(l, xp, y),
            Self::new(l, xm, yp),
            Self::new(l, x, yp),
            Self::new(l, xp, yp),
        ]
    }

    /// Chebyshev distance to `other`, or `None` across levels.
    pub const fn dist8(self, other: Self) -> Option<u32> {
        if self.level != other.level {
            return None;
        }
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        Some(if dx > dy { dx } else { dy })
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:({}, {})", self.level, self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Costs
// ---------------------------------------------------------------------------

/// An amount of one resource kind.
///
/// The value is signed so that a malformed negative cost can be reported
/// as an error instead of silently wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CostInfo {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Amount of the resource.
    pub value: i64,
}

impl CostInfo {
    /// Create a cost.
    pub const fn new(kind: ResourceKind, value: i64) -> Self {
        Self { kind, value }
    }

    /// The zero cost.
    pub const fn free() -> Self {
        Self {
            kind: ResourceKind::Gold,
            value: 0,
        }
    }

    /// Whether this cost is zero.
    pub const fn is_free(&self) -> bool {
        self.value == 0
    }
}

impl Default for CostInfo {
    fn default() -> Self {
        Self::free()
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// An item lying in the world, as seen by the colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Item {
    /// Item handle.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Coarse classification.
    pub class: ItemClass,
    /// The resource this item counts as, if any.
    pub resource: Option<ResourceKind>,
    /// Price in gold.
    pub price: u32,
    /// Trap furniture this item places when applied.
    pub trap: Option<FurnitureKind>,
    /// Whether a shopkeeper offers it for sale.
    pub for_sale: bool,
}

impl Item {
    /// Create a plain item of the given class.
    pub fn new(name: impl Into<String>, class: ItemClass) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            class,
            resource: None,
            price: 0,
            trap: None,
            for_sale: false,
        }
    }

    /// Create an item that counts as one unit of `kind`.
    pub fn resource(kind: ResourceKind) -> Self {
        let class = if kind == ResourceKind::Corpse {
            ItemClass::Corpse
        } else {
            ItemClass::Resource
        };
        Self {
            resource: Some(kind),
            ..Self::new(format!("{kind:?}").to_lowercase(), class)
        }
    }

    /// Create a trap kit placing `trap`.
    pub fn trap_kit(trap: FurnitureKind) -> Self {
        Self {
            trap: Some(trap),
            ..Self::new(format!("{trap:?} kit").to_lowercase(), ItemClass::Trap)
        }
    }

    /// Set the price and return `self`.
    #[must_use]
    pub const fn with_price(mut self, price: u32) -> Self {
        self.price = price;
        self
    }

    /// Mark as offered for sale and return `self`.
    #[must_use]
    pub const fn for_sale(mut self) -> Self {
        self.for_sale = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Tribes, messages, alarms
// ---------------------------------------------------------------------------

/// Allegiance of a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TribeId(pub u32);

impl TribeId {
    /// Wild monsters; escaped prisoners join this tribe.
    pub const MONSTER: Self = Self(0);
}

/// A message addressed to the player or the colony's controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerMessage {
    /// Message text.
    pub text: String,
    /// Importance.
    pub priority: MessagePriority,
    /// Where it happened, if anywhere in particular.
    pub position: Option<Position>,
}

impl PlayerMessage {
    /// Create a normal-priority message.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: MessagePriority::Normal,
            position: None,
        }
    }

    /// Set the priority and return `self`.
    #[must_use]
    pub const fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a position and return `self`.
    #[must_use]
    pub const fn at(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }
}

/// An active alarm inside the colony's territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AlarmInfo {
    /// Global time at which the alarm stops.
    pub finish_time: u64,
    /// Where the alarm went off.
    pub position: Position,
}

// ---------------------------------------------------------------------------
// Read-only views
// ---------------------------------------------------------------------------

/// Population counts exposed to a presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationStats {
    /// Number of members.
    pub members: u32,
    /// Population counted against the limit.
    pub population: u32,
    /// Current population limit.
    pub max_population: u32,
    /// Members with the fighter trait.
    pub fighters: u32,
    /// Members with the worker trait.
    pub workers: u32,
    /// Members with the prisoner trait.
    pub prisoners: u32,
    /// Members with the leader trait.
    pub leaders: u32,
    /// Members whose derived status is civilian.
    pub civilians: u32,
}

/// Amount owned and owed for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceSummary {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Credit plus stored items.
    pub owned: i64,
    /// Outstanding obligations.
    pub debt: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_surround_position() {
        let p = Position::new(0, 5, 5);
        let n = p.neighbors8();
        assert_eq!(n.len(), 8);
        assert!(n.iter().all(|q| p.dist8(*q) == Some(1)));
        assert!(!n.contains(&p));
    }

    #[test]
    fn dist8_is_chebyshev_and_level_aware() {
        let a = Position::new(1, 0, 0);
        assert_eq!(a.dist8(Position::new(1, 3, -7)), Some(7));
        assert_eq!(a.dist8(Position::new(2, 0, 0)), None);
    }

    #[test]
    fn free_cost_is_free() {
        assert!(CostInfo::free().is_free());
        assert!(!CostInfo::new(ResourceKind::Wood, 5).is_free());
    }

    #[test]
    fn resource_items_count_as_their_kind() {
        let wood = Item::resource(ResourceKind::Wood);
        assert_eq!(wood.resource, Some(ResourceKind::Wood));
        assert_eq!(wood.class, ItemClass::Resource);
        let corpse = Item::resource(ResourceKind::Corpse);
        assert_eq!(corpse.class, ItemClass::Corpse);
    }
}
