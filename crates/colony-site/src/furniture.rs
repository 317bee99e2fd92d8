//! Static furniture data the scheduler branches on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use colony_types::{
    CostInfo, DestroyKind, ExperienceKind, FurnitureKind, FurnitureLayer, MinionActivity,
    ResourceKind, StorageKind, WorkshopKind,
};

/// What happens when a minion applies a piece of furniture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FurnitureUsage {
    /// Sleeping.
    Sleep,
    /// Raises one experience track.
    Train(ExperienceKind),
    /// The user gets whipped.
    Whipping,
    /// The user gets tortured.
    Torture,
    /// The user gets executed.
    Execution,
    /// Writing poetry.
    Poetry,
    /// Demon ritual producing piety.
    Ritual,
    /// Production in a workshop.
    Workshop(WorkshopKind),
}

impl FurnitureUsage {
    /// The activity that uses furniture of this kind.
    pub const fn activity(self) -> MinionActivity {
        match self {
            Self::Sleep => MinionActivity::Sleep,
            Self::Train(ExperienceKind::Melee) => MinionActivity::Train,
            Self::Train(ExperienceKind::Spell) => MinionActivity::Study,
            Self::Train(ExperienceKind::Archery) => MinionActivity::Archery,
            Self::Whipping => MinionActivity::BeWhipped,
            Self::Torture => MinionActivity::BeTortured,
            Self::Execution => MinionActivity::BeExecuted,
            Self::Poetry => MinionActivity::Poetry,
            Self::Ritual => MinionActivity::Ritual,
            Self::Workshop(_) => MinionActivity::Craft,
        }
    }
}

/// Static data for one furniture kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureInfo {
    /// Layer occupied.
    pub layer: FurnitureLayer,
    /// Construction cost.
    pub cost: CostInfo,
    /// Population limit added per built piece.
    pub population_increase: u32,
    /// Storage this furniture provides once built.
    pub storage: Option<StorageKind>,
    /// Dropped from the registry once built (bridges).
    pub forget_after_building: bool,
    /// Placed by a trap kit rather than built.
    pub trap: bool,
    /// Usage when applied by a minion.
    pub usage: Option<FurnitureUsage>,
    /// Danger added per built piece.
    pub danger: u32,
    /// How this furniture is removed by a destruction order.
    pub destroy: DestroyKind,
    /// Can be planned outside the colony's territory.
    pub build_outside_territory: bool,
}

impl FurnitureInfo {
    fn new(layer: FurnitureLayer, kind: ResourceKind, value: i64) -> Self {
        Self {
            layer,
            cost: CostInfo::new(kind, value),
            population_increase: 0,
            storage: None,
            forget_after_building: false,
            trap: false,
            usage: None,
            danger: 0,
            destroy: DestroyKind::Bash,
            build_outside_territory: false,
        }
    }

    fn usage(mut self, usage: FurnitureUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Lookup table from [`FurnitureKind`] to [`FurnitureInfo`].
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureCatalog {
    infos: BTreeMap<FurnitureKind, FurnitureInfo>,
}

impl FurnitureCatalog {
    /// The standard table.
    #[allow(clippy::too_many_lines)]
    pub fn standard() -> Self {
        use FurnitureKind as F;
        use FurnitureLayer::{Ceiling, Floor, Middle};
        use ResourceKind::{Gold, Iron, PrisonerHead, Stone, Wood};

        let mut infos = BTreeMap::new();
        infos.insert(F::WoodFloor, FurnitureInfo::new(Floor, Wood, 2));
        infos.insert(F::StoneFloor, FurnitureInfo::new(Floor, Stone, 2));
        infos.insert(
            F::Bridge,
            FurnitureInfo {
                forget_after_building: true,
                build_outside_territory: true,
                ..FurnitureInfo::new(Floor, Wood, 5)
            },
        );
        infos.insert(F::Door, FurnitureInfo::new(Middle, Wood, 5));
        infos.insert(
            F::Bed,
            FurnitureInfo {
                population_increase: 1,
                ..FurnitureInfo::new(Middle, Wood, 6).usage(FurnitureUsage::Sleep)
            },
        );
        infos.insert(
            F::TrainingDummy,
            FurnitureInfo::new(Middle, Wood, 10).usage(FurnitureUsage::Train(ExperienceKind::Melee)),
        );
        infos.insert(
            F::ArcheryRange,
            FurnitureInfo::new(Middle, Wood, 10)
                .usage(FurnitureUsage::Train(ExperienceKind::Archery)),
        );
        infos.insert(
            F::Bookcase,
            FurnitureInfo::new(Middle, Wood, 15).usage(FurnitureUsage::Train(ExperienceKind::Spell)),
        );
        infos.insert(
            F::Workshop,
            FurnitureInfo::new(Middle, Wood, 15)
                .usage(FurnitureUsage::Workshop(WorkshopKind::Workshop)),
        );
        infos.insert(
            F::Forge,
            FurnitureInfo::new(Middle, Iron, 20).usage(FurnitureUsage::Workshop(WorkshopKind::Forge)),
        );
        infos.insert(
            F::Laboratory,
            FurnitureInfo::new(Middle, Stone, 15)
                .usage(FurnitureUsage::Workshop(WorkshopKind::Laboratory)),
        );
        infos.insert(
            F::Jeweller,
            FurnitureInfo::new(Middle, Wood, 20)
                .usage(FurnitureUsage::Workshop(WorkshopKind::Jeweller)),
        );
        infos.insert(
            F::TreasureChest,
            FurnitureInfo {
                storage: Some(StorageKind::Gold),
                ..FurnitureInfo::new(Middle, Wood, 5)
            },
        );
        infos.insert(
            F::Grave,
            FurnitureInfo {
                storage: Some(StorageKind::Corpses),
                ..FurnitureInfo::new(Middle, Stone, 10)
            },
        );
        infos.insert(
            F::WhippingPost,
            FurnitureInfo::new(Middle, Wood, 10).usage(FurnitureUsage::Whipping),
        );
        infos.insert(
            F::TortureTable,
            FurnitureInfo::new(Middle, Iron, 20).usage(FurnitureUsage::Torture),
        );
        infos.insert(
            F::Gallows,
            FurnitureInfo::new(Middle, Wood, 20).usage(FurnitureUsage::Execution),
        );
        infos.insert(
            F::PoetryTable,
            FurnitureInfo::new(Middle, Wood, 15).usage(FurnitureUsage::Poetry),
        );
        infos.insert(
            F::DemonShrine,
            FurnitureInfo::new(Middle, Stone, 30).usage(FurnitureUsage::Ritual),
        );
        infos.insert(
            F::ImpaledHead,
            FurnitureInfo {
                danger: 150,
                ..FurnitureInfo::new(Middle, PrisonerHead, 1)
            },
        );
        infos.insert(
            F::Throne,
            FurnitureInfo {
                population_increase: 5,
                ..FurnitureInfo::new(Middle, Gold, 800)
            },
        );
        infos.insert(F::Torch, FurnitureInfo::new(Ceiling, Wood, 1));
        for trap in [F::BoulderTrap, F::PoisonGasTrap, F::AlarmTrap, F::SurpriseTrap] {
            infos.insert(
                trap,
                FurnitureInfo {
                    trap: true,
                    ..FurnitureInfo::new(Middle, Gold, 0)
                },
            );
        }
        infos.insert(
            F::Rock,
            FurnitureInfo {
                destroy: DestroyKind::Dig,
                ..FurnitureInfo::new(Middle, Gold, 0)
            },
        );
        infos.insert(
            F::Tree,
            FurnitureInfo {
                destroy: DestroyKind::Cut,
                ..FurnitureInfo::new(Middle, Gold, 0)
            },
        );
        Self { infos }
    }

    /// Info for `kind`, if known.
    pub fn info(&self, kind: FurnitureKind) -> Option<&FurnitureInfo> {
        self.infos.get(&kind)
    }

    /// Layer of `kind`; unknown kinds default to the middle layer.
    pub fn layer_of(&self, kind: FurnitureKind) -> FurnitureLayer {
        self.info(kind).map_or(FurnitureLayer::Middle, |i| i.layer)
    }

    /// Construction cost of `kind`.
    pub fn cost_of(&self, kind: FurnitureKind) -> CostInfo {
        self.info(kind).map_or_else(CostInfo::free, |i| i.cost)
    }

    /// Population limit added by `count` built pieces of `kind`.
    pub fn population_increase(&self, kind: FurnitureKind, count: usize) -> u32 {
        let per = self.info(kind).map_or(0, |i| i.population_increase);
        per.saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Kinds providing `storage` once built.
    pub fn storage_furniture(&self, storage: StorageKind) -> Vec<FurnitureKind> {
        self.infos
            .iter()
            .filter(|(_, i)| i.storage == Some(storage))
            .map(|(k, _)| *k)
            .collect()
    }

    /// Kinds whose usage serves `activity`.
    pub fn for_activity(&self, activity: MinionActivity) -> Vec<FurnitureKind> {
        self.infos
            .iter()
            .filter(|(_, i)| i.usage.is_some_and(|u| u.activity() == activity))
            .map(|(k, _)| *k)
            .collect()
    }

    /// Workshop category of `kind`, if it is workshop furniture.
    pub fn workshop_of(&self, kind: FurnitureKind) -> Option<WorkshopKind> {
        match self.info(kind)?.usage? {
            FurnitureUsage::Workshop(w) => Some(w),
            _ => None,
        }
    }

    /// Override the info for one kind.
    pub fn set(&mut self, kind: FurnitureKind, info: FurnitureInfo) {
        self.infos.insert(kind, info);
    }
}

impl Default for FurnitureCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
