//! Enumeration types for the colony management engine.
//!
//! Content in the original game is data-driven; here every category the
//! scheduler branches on is a closed enum so that matches stay exhaustive.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Minion traits and derived status
// ---------------------------------------------------------------------------

/// A membership trait a colony assigns to one of its minions.
///
/// Traits are the ground truth for a minion's role. Derived status flags
/// ([`CreatureStatus`]) are always projected from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MinionTrait {
    /// The keeper or village chief. Losing all leaders may conquer the colony.
    Leader,
    /// Counts towards military strength and conquest.
    Fighter,
    /// Performs labour tasks (digging, hauling, construction).
    Worker,
    /// A captured creature held against its will.
    Prisoner,
    /// Does not count towards the population limit.
    NoLimit,
    /// Livestock. Never gets a colony controller.
    FarmAnimal,
    /// Temporarily summoned creature.
    Summoned,
    /// Never managed by the equipment subsystem.
    NoEquipment,
    /// Mechanical minion powered by the colony's population budget.
    Automaton,
}

impl MinionTrait {
    /// Number of trait variants.
    pub const COUNT: usize = 9;

    /// All traits in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Leader,
        Self::Fighter,
        Self::Worker,
        Self::Prisoner,
        Self::NoLimit,
        Self::FarmAnimal,
        Self::Summoned,
        Self::NoEquipment,
        Self::Automaton,
    ];

    /// Dense index of this trait, suitable for enum-indexed arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A status flag visible to the rest of the simulation.
///
/// Status is never stored independently of traits; it is recomputed
/// whenever a minion's trait set changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CreatureStatus {
    /// Humanoid member that is neither fighter nor leader and is conscious.
    Civilian,
    /// Member holding the fighter trait.
    Fighter,
    /// Member holding the leader trait.
    Leader,
    /// Member holding the prisoner trait.
    Prisoner,
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// What a minion is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MinionActivity {
    /// Nothing in particular.
    Idle,
    /// Sleeping in a bed.
    Sleep,
    /// Eating.
    Eat,
    /// Building planned furniture and placing traps.
    Construction,
    /// Digging and cutting trees.
    Digging,
    /// Carrying items into storage.
    Hauling,
    /// Standing watch on a guard post.
    Guarding,
    /// Installing automaton parts and disassembling.
    Craft,
    /// Operating punishment furniture on other minions.
    Working,
    /// Melee training on training furniture.
    Train,
    /// Studying spells in the library.
    Study,
    /// Archery practice.
    Archery,
    /// Tending crops (daylight only).
    Crops,
    /// Exploring the surface (daylight only).
    Explore,
    /// Exploring at night.
    ExploreNocturnal,
    /// Being whipped to restore discipline.
    BeWhipped,
    /// Being tortured (possible conversion).
    BeTortured,
    /// Being executed.
    BeExecuted,
    /// Writing poetry.
    Poetry,
    /// Performing a demon ritual.
    Ritual,
}

impl MinionActivity {
    /// Number of activity variants.
    pub const COUNT: usize = 20;

    /// All activities in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Idle,
        Self::Sleep,
        Self::Eat,
        Self::Construction,
        Self::Digging,
        Self::Hauling,
        Self::Guarding,
        Self::Craft,
        Self::Working,
        Self::Train,
        Self::Study,
        Self::Archery,
        Self::Crops,
        Self::Explore,
        Self::ExploreNocturnal,
        Self::BeWhipped,
        Self::BeTortured,
        Self::BeExecuted,
        Self::Poetry,
        Self::Ritual,
    ];
}

/// Experience tracks raised by training furniture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ExperienceKind {
    /// Close combat.
    Melee,
    /// Spellcasting.
    Spell,
    /// Ranged combat.
    Archery,
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// A lasting effect the colony reads or applies through the agent service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LastingEffect {
    /// Asleep.
    Sleep,
    /// Well rested; seeded on joining.
    Rested,
    /// Well fed; seeded on joining.
    Satiated,
    /// Unconscious after capture.
    Stunned,
    /// Tied up as a prisoner.
    TiedUp,
    /// Held by webs or roots.
    Entangled,
    /// Created by a summoning spell.
    Summoned,
    /// Automaton engine disabled.
    TurnedOff,
}

// ---------------------------------------------------------------------------
// Resources and storage
// ---------------------------------------------------------------------------

/// A resource kind tracked by the colony ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Gold coins kept in treasure chests.
    Gold,
    /// Wood planks.
    Wood,
    /// Iron ore.
    Iron,
    /// Cut stone.
    Stone,
    /// Rare metal.
    Adamantium,
    /// Abstract magical energy; never a physical item.
    Mana,
    /// Trophy gained when a prisoner is killed by a member.
    PrisonerHead,
    /// Abstract piety produced by demon rituals.
    DemonPiety,
    /// Bodies kept in graves.
    Corpse,
}

impl ResourceKind {
    /// Number of resource variants.
    pub const COUNT: usize = 9;

    /// All resource kinds in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Gold,
        Self::Wood,
        Self::Iron,
        Self::Stone,
        Self::Adamantium,
        Self::Mana,
        Self::PrisonerHead,
        Self::DemonPiety,
        Self::Corpse,
    ];
}

/// A kind of storage the colony designates for physical items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum StorageKind {
    /// Raw resource stockpile zone.
    Resource,
    /// Equipment stockpile zone.
    Equipment,
    /// Built treasure chests.
    Gold,
    /// Built graves.
    Corpses,
}

/// Coarse item classification used for fetching and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ItemClass {
    /// A physical resource item (wood, gold, stone, ...).
    Resource,
    /// Weapon.
    Weapon,
    /// Armor.
    Armor,
    /// Potion.
    Potion,
    /// A trap kit that places trap furniture when applied.
    Trap,
    /// A part installable into an automaton.
    AutomatonPart,
    /// A corpse.
    Corpse,
    /// Anything else.
    Misc,
}

// ---------------------------------------------------------------------------
// Furniture and construction
// ---------------------------------------------------------------------------

/// The layer a piece of furniture occupies at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FurnitureLayer {
    /// Floors and bridges.
    Floor,
    /// Beds, workshops, traps, rocks and trees.
    Middle,
    /// Torches and other wall or ceiling mounts.
    Ceiling,
}

/// A kind of furniture that can be planned, built, or found in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FurnitureKind {
    /// Wooden floor.
    WoodFloor,
    /// Stone floor.
    StoneFloor,
    /// Bridge over water; forgotten once built.
    Bridge,
    /// Door.
    Door,
    /// Bed; raises the population limit.
    Bed,
    /// Melee training dummy.
    TrainingDummy,
    /// Archery target.
    ArcheryRange,
    /// Bookcase for studying.
    Bookcase,
    /// Basic workshop.
    Workshop,
    /// Forge.
    Forge,
    /// Alchemy laboratory.
    Laboratory,
    /// Jeweller's bench.
    Jeweller,
    /// Treasure chest; gold storage.
    TreasureChest,
    /// Grave; corpse storage.
    Grave,
    /// Whipping post.
    WhippingPost,
    /// Torture table.
    TortureTable,
    /// Gallows.
    Gallows,
    /// Poetry table.
    PoetryTable,
    /// Demon shrine.
    DemonShrine,
    /// Impaled head; raises the danger level.
    ImpaledHead,
    /// Throne.
    Throne,
    /// Torch.
    Torch,
    /// Boulder trap.
    BoulderTrap,
    /// Poison gas trap.
    PoisonGasTrap,
    /// Alarm trap.
    AlarmTrap,
    /// Surprise trap.
    SurpriseTrap,
    /// Natural rock; can be dug.
    Rock,
    /// Natural tree; can be cut.
    Tree,
}

/// The way a destruction order removes furniture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DestroyKind {
    /// Digging through rock; claims the tile.
    Dig,
    /// Cutting a tree; leaves items to fetch.
    Cut,
    /// Smashing furniture.
    Bash,
}

/// Highlight shown on a marked square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum HighlightKind {
    /// Square marked for digging or bashing.
    Dig,
    /// Square marked for tree cutting.
    CutTree,
}

/// Production workshop categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum WorkshopKind {
    /// Basic workshop (trap kits, wooden gear).
    Workshop,
    /// Forge (weapons, armor).
    Forge,
    /// Laboratory (potions).
    Laboratory,
    /// Jeweller (rings, amulets).
    Jeweller,
}

// ---------------------------------------------------------------------------
// Zones and world state
// ---------------------------------------------------------------------------

/// A named region tag over a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ZoneKind {
    /// Raw resource stockpile.
    StorageResources,
    /// Equipment stockpile.
    StorageEquipment,
    /// Guard post; one guard task per position.
    Guard,
    /// Items here are fetched once; the tag is cleared when emptied.
    FetchItems,
    /// Items here are always fetched.
    PermanentFetchItems,
    /// Minions avoid these positions.
    Forbidden,
    /// Leisure area.
    Leisure,
}

impl ZoneKind {
    /// Number of zone variants.
    pub const COUNT: usize = 7;

    /// All zone kinds in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::StorageResources,
        Self::StorageEquipment,
        Self::Guard,
        Self::FetchItems,
        Self::PermanentFetchItems,
        Self::Forbidden,
        Self::Leisure,
    ];
}

/// State of the world's light cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SunlightState {
    /// Sun is up.
    Day,
    /// Sun is down.
    Night,
}

/// Condition under which a colony counts as conquered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ConquerCondition {
    /// No fighters and no leaders remain.
    KillFightersAndLeader,
    /// No leaders remain.
    KillLeader,
    /// The colony can never be conquered.
    Never,
}

/// Message importance for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MessagePriority {
    /// Routine information.
    Normal,
    /// Worth the player's attention.
    High,
    /// Requires immediate attention.
    Critical,
}

/// A condition surfaced to the player by the periodic warning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Warning {
    /// Resources are lying around but no resource storage exists.
    NoResourceStorage,
    /// Equipment is lying around but no equipment storage exists.
    NoEquipmentStorage,
    /// Gold is lying around but no treasure chest exists.
    NoGoldStorage,
    /// Corpses are lying around but no grave exists.
    NoCorpseStorage,
    /// The colony had a leader and lost it.
    NoLeader,
    /// Average fighter morale is low.
    LowMorale,
    /// Population has reached the limit.
    PopulationFull,
}

impl Warning {
    /// Number of warning variants.
    pub const COUNT: usize = 7;

    /// All warnings in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::NoResourceStorage,
        Self::NoEquipmentStorage,
        Self::NoGoldStorage,
        Self::NoCorpseStorage,
        Self::NoLeader,
        Self::LowMorale,
        Self::PopulationFull,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_indices_are_dense() {
        for (i, t) in MinionTrait::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn all_lists_have_no_duplicates() {
        let activities: std::collections::BTreeSet<_> = MinionActivity::ALL.iter().collect();
        assert_eq!(activities.len(), MinionActivity::COUNT);
        let resources: std::collections::BTreeSet<_> = ResourceKind::ALL.iter().collect();
        assert_eq!(resources.len(), ResourceKind::COUNT);
        let zones: std::collections::BTreeSet<_> = ZoneKind::ALL.iter().collect();
        assert_eq!(zones.len(), ZoneKind::COUNT);
    }

    #[test]
    fn enums_serialize_as_variant_names() {
        let json = serde_json::to_string(&ResourceKind::PrisonerHead).ok();
        assert_eq!(json.as_deref(), Some("\"PrisonerHead\""));
    }
}
