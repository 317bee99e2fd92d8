//! Resource queries and movements.
//!
//! Storage for gold and corpses is furniture (treasure chests, graves);
//! storage for other resources and for equipment is a zone. The ledger
//! itself only sees the positions handed to it.

use colony_ledger::Debt;
use colony_types::{CostInfo, Position, ResourceKind, ResourceSummary, StorageKind, ZoneKind};

use crate::error::ColonyError;
use crate::world::{Env, World};

use super::Colony;

impl Colony {
    /// Positions providing `storage`.
    pub fn storage_positions(&self, storage: StorageKind) -> Vec<Position> {
        match storage {
            StorageKind::Resource => self
                .zones
                .positions(ZoneKind::StorageResources)
                .iter()
                .copied()
                .collect(),
            StorageKind::Equipment => self
                .zones
                .positions(ZoneKind::StorageEquipment)
                .iter()
                .copied()
                .collect(),
            StorageKind::Gold | StorageKind::Corpses => self
                .furniture
                .storage_furniture(storage)
                .into_iter()
                .flat_map(|kind| self.constructions.built_positions(kind))
                .collect(),
        }
    }

    /// Storage positions for resources of `kind`; empty for abstract kinds.
    pub fn storage_for(&self, kind: ResourceKind) -> Vec<Position> {
        self.ledger
            .catalog()
            .storage_of(kind)
            .map(|storage| self.storage_positions(storage))
            .unwrap_or_default()
    }

    /// Credit plus stored items of `kind`.
    pub fn num_resource(&self, kind: ResourceKind, world: &dyn World) -> i64 {
        self.ledger.num_resource(kind, &self.storage_for(kind), world)
    }

    /// Whether the colony owns at least `cost`.
    pub fn has_resource(&self, cost: &CostInfo, world: &dyn World) -> bool {
        self.ledger
            .has_resource(cost, &self.storage_for(cost.kind), world)
    }

    /// Outstanding obligations in `kind`: unbuilt constructions minus what
    /// their tasks already took, plus unfunded workshop batches.
    pub fn debt(&self, kind: ResourceKind) -> i64 {
        Debt {
            constructions: self.constructions.debt(kind),
            funded_tasks: self.tasks.funded_cost(kind),
            workshops: self.workshops.debt(kind),
        }
        .total()
    }

    /// Owned minus owed.
    pub fn available(&self, kind: ResourceKind, world: &dyn World) -> i64 {
        self.num_resource(kind, world).saturating_sub(self.debt(kind))
    }

    /// Owned and owed amounts of every kind.
    pub fn resource_summary(&self, world: &dyn World) -> Vec<ResourceSummary> {
        ResourceKind::ALL
            .into_iter()
            .map(|kind| ResourceSummary {
                kind,
                owned: self.num_resource(kind, world),
                debt: self.debt(kind),
            })
            .collect()
    }

    /// Grant credit directly, bypassing storage.
    pub fn add_credit(&mut self, kind: ResourceKind, amount: i64) {
        self.ledger.add_credit(kind, amount);
    }

    /// Remove `cost` from the colony, credit first.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] when the colony cannot cover the cost. Check
    /// [`Colony::has_resource`] first.
    pub fn take_resource(&mut self, cost: &CostInfo, env: &mut Env<'_>) -> Result<(), ColonyError> {
        let storage = self.storage_for(cost.kind);
        self.ledger
            .take_resource(cost, &storage, &mut *env.world, env.now)?;
        Ok(())
    }

    /// Give `cost` back, as items in storage when possible.
    ///
    /// # Errors
    ///
    /// [`ColonyError::Ledger`] for a negative cost.
    pub fn return_resource(
        &mut self,
        cost: &CostInfo,
        env: &mut Env<'_>,
    ) -> Result<(), ColonyError> {
        let storage = self.storage_for(cost.kind);
        self.ledger
            .return_resource(cost, &storage, &mut *env.world, &mut *env.dice, env.now)?;
        Ok(())
    }

    pub(super) fn refund(&mut self, cost: CostInfo, env: &mut Env<'_>) -> Result<(), ColonyError> {
        if cost.is_free() {
            return Ok(());
        }
        self.return_resource(&cost, env)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{FurnitureKind, FurnitureLayer, Item, SunlightState, TribeId};

    use crate::config::ColonyConfig;
    use crate::dice::ScriptedDice;
    use crate::sandbox::SandboxWorld;

    use super::*;

    const CHEST: Position = Position::new(0, 1, 1);
    const PILE: Position = Position::new(0, 2, 2);

    #[test]
    fn gold_storage_is_built_chests_only() {
        let mut world = SandboxWorld::new(8, 8);
        let mut colony = Colony::new(TribeId(1), ColonyConfig::default());
        world.set_furniture(CHEST, FurnitureLayer::Middle, Some(FurnitureKind::TreasureChest));
        assert!(colony.storage_positions(StorageKind::Gold).is_empty());
        colony.claim_square(CHEST, &world);
        assert_eq!(colony.storage_positions(StorageKind::Gold), vec![CHEST]);
        assert!(colony.storage_for(ResourceKind::Mana).is_empty());
    }

    #[test]
    fn resources_count_credit_and_zone_items() {
        let mut world = SandboxWorld::new(8, 8);
        let mut colony = Colony::new(TribeId(1), ColonyConfig::default());
        colony.set_zone(PILE, ZoneKind::StorageResources);
        world.put_item(PILE, Item::resource(ResourceKind::Wood));
        world.put_item(PILE, Item::resource(ResourceKind::Wood));
        colony.add_credit(ResourceKind::Wood, 3);
        assert_eq!(colony.num_resource(ResourceKind::Wood, &world), 5);
        assert!(colony.has_resource(&CostInfo::new(ResourceKind::Wood, 5), &world));
        assert!(!colony.has_resource(&CostInfo::new(ResourceKind::Wood, 6), &world));
    }

    #[test]
    fn take_then_return_keeps_total() {
        let mut world = SandboxWorld::new(8, 8);
        let mut dice = ScriptedDice::new();
        let mut colony = Colony::new(TribeId(1), ColonyConfig::default());
        colony.set_zone(PILE, ZoneKind::StorageResources);
        world.put_item(PILE, Item::resource(ResourceKind::Stone));
        colony.add_credit(ResourceKind::Stone, 2);
        let cost = CostInfo::new(ResourceKind::Stone, 3);
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        colony.take_resource(&cost, &mut env).unwrap();
        assert_eq!(colony.num_resource(ResourceKind::Stone, &*env.world), 0);
        colony.return_resource(&cost, &mut env).unwrap();
        assert_eq!(colony.num_resource(ResourceKind::Stone, &*env.world), 3);
        // The return went to the stockpile, not to credit.
        assert_eq!(colony.ledger().credit(ResourceKind::Stone), 0);
    }

    #[test]
    fn over_take_is_an_error_and_changes_nothing() {
        let mut world = SandboxWorld::new(8, 8);
        let mut dice = ScriptedDice::new();
        let mut colony = Colony::new(TribeId(1), ColonyConfig::default());
        colony.add_credit(ResourceKind::Gold, 4);
        let mut env = Env::new(&mut world, &mut dice, 1, SunlightState::Day);
        let err = colony
            .take_resource(&CostInfo::new(ResourceKind::Gold, 5), &mut env)
            .unwrap_err();
        assert!(matches!(err, ColonyError::Ledger { .. }));
        assert_eq!(colony.ledger().credit(ResourceKind::Gold), 4);
    }
}
