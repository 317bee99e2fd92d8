//! Static description of every resource kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use colony_types::{ResourceKind, StorageKind};

/// How one resource kind is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Display name.
    pub name: String,
    /// Storage where physical units are counted, if any.
    pub storage: Option<StorageKind>,
    /// Whether returned amounts become physical items when storage exists.
    pub item_backed: bool,
}

/// Lookup table from [`ResourceKind`] to [`ResourceInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCatalog {
    infos: BTreeMap<ResourceKind, ResourceInfo>,
}

impl ResourceCatalog {
    /// The standard table.
    ///
    /// Metals, wood, stone and gold are physical and live in storage;
    /// mana, piety and prisoner heads are abstract counters.
    pub fn standard() -> Self {
        let mut infos = BTreeMap::new();
        for kind in ResourceKind::ALL {
            let (storage, item_backed) = match kind {
                ResourceKind::Gold => (Some(StorageKind::Gold), true),
                ResourceKind::Wood
                | ResourceKind::Iron
                | ResourceKind::Stone
                | ResourceKind::Adamantium => (Some(StorageKind::Resource), true),
                ResourceKind::Corpse => (Some(StorageKind::Corpses), true),
                ResourceKind::Mana | ResourceKind::PrisonerHead | ResourceKind::DemonPiety => {
                    (None, false)
                }
            };
            infos.insert(
                kind,
                ResourceInfo {
                    name: format!("{kind:?}").to_lowercase(),
                    storage,
                    item_backed,
                },
            );
        }
        Self { infos }
    }

    /// Info for `kind`, if the catalog knows it.
    pub fn info(&self, kind: ResourceKind) -> Option<&ResourceInfo> {
        self.infos.get(&kind)
    }

    /// Storage where physical `kind` units are counted.
    pub fn storage_of(&self, kind: ResourceKind) -> Option<StorageKind> {
        self.infos.get(&kind).and_then(|i| i.storage)
    }

    /// Override the info for one kind.
    pub fn set(&mut self, kind: ResourceKind, info: ResourceInfo) {
        self.infos.insert(kind, info);
    }
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_info() {
        let catalog = ResourceCatalog::standard();
        for kind in ResourceKind::ALL {
            assert!(catalog.info(kind).is_some(), "{kind:?}");
        }
    }

    #[test]
    fn abstract_kinds_have_no_storage() {
        let catalog = ResourceCatalog::standard();
        assert_eq!(catalog.storage_of(ResourceKind::Mana), None);
        assert_eq!(catalog.storage_of(ResourceKind::Gold), Some(StorageKind::Gold));
        assert_eq!(catalog.storage_of(ResourceKind::Wood), Some(StorageKind::Resource));
    }
}
