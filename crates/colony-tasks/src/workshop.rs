//! Workshop production queues.
//!
//! Each workshop category holds a list of production options and a queue
//! of items to make. A queued item with a cost is unfunded until the
//! colony can afford it; unfunded costs count towards the colony's debt.
//! Work applied by minions on workshop furniture advances the funded head
//! of the queue.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use colony_types::{CostInfo, FurnitureKind, Item, ItemClass, ResourceKind, WorkshopKind};

use crate::TaskError;

/// One thing a workshop knows how to make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOption {
    /// Name given to produced items.
    pub name: String,
    /// Class of produced items.
    pub class: ItemClass,
    /// Trap placed by produced items, for trap kits.
    pub trap: Option<FurnitureKind>,
    /// Material cost per batch.
    pub cost: Option<CostInfo>,
    /// Work units per batch.
    pub work_needed: f64,
    /// Items per batch.
    pub batch_size: u32,
}

impl ProductionOption {
    fn new(name: &str, class: ItemClass, cost: Option<CostInfo>, work_needed: f64) -> Self {
        Self {
            name: name.to_owned(),
            class,
            trap: None,
            cost,
            work_needed,
            batch_size: 1,
        }
    }

    /// Build one finished item.
    pub fn produce(&self) -> Item {
        let mut item = Item::new(self.name.clone(), self.class);
        item.trap = self.trap;
        item
    }
}

/// One queued batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedItem {
    /// Index into the workshop's options.
    pub option: usize,
    /// Material cost has been taken.
    pub funded: bool,
    /// Work applied so far.
    pub progress: f64,
}

/// A single workshop category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workshop {
    options: Vec<ProductionOption>,
    queue: Vec<QueuedItem>,
}

impl Workshop {
    /// Create with the given options and an empty queue.
    pub const fn new(options: Vec<ProductionOption>) -> Self {
        Self {
            options,
            queue: Vec::new(),
        }
    }

    /// Available options.
    pub fn options(&self) -> &[ProductionOption] {
        &self.options
    }

    /// Queued batches, head first.
    pub fn queued(&self) -> &[QueuedItem] {
        &self.queue
    }

    /// Queue one batch of option `index`.
    ///
    /// # Errors
    ///
    /// [`TaskError::UnknownOption`] if `index` is out of range.
    pub fn queue(&mut self, index: usize) -> Result<(), TaskError> {
        let option = self
            .options
            .get(index)
            .ok_or(TaskError::UnknownOption(index))?;
        self.queue.push(QueuedItem {
            option: index,
            funded: option.cost.is_none_or(|c| c.is_free()),
            progress: 0.0,
        });
        Ok(())
    }

    /// Sum of unfunded queued costs in `kind`.
    pub fn debt(&self, kind: ResourceKind) -> i64 {
        self.queue
            .iter()
            .filter(|q| !q.funded)
            .filter_map(|q| self.options.get(q.option).and_then(|o| o.cost))
            .filter(|c| c.kind == kind)
            .fold(0_i64, |acc, c| acc.saturating_add(c.value))
    }

    /// Cost of the head batch if it is still unfunded.
    pub fn unfunded_head(&self) -> Option<CostInfo> {
        let head = self.queue.first().filter(|q| !q.funded)?;
        self.options.get(head.option).and_then(|o| o.cost)
    }

    /// Mark the head batch funded.
    pub fn fund_head(&mut self) {
        if let Some(head) = self.queue.first_mut() {
            head.funded = true;
        }
    }

    /// Apply `amount` work to the funded head batch. Returns the finished
    /// items when the batch completes.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn add_work(&mut self, amount: f64) -> Vec<Item> {
        let Some(head) = self.queue.first_mut() else {
            return Vec::new();
        };
        if !head.funded {
            return Vec::new();
        }
        head.progress += amount;
        let Some(option) = self.options.get(head.option) else {
            return Vec::new();
        };
        if head.progress < option.work_needed {
            return Vec::new();
        }
        let items: Vec<Item> = (0..option.batch_size).map(|_| option.produce()).collect();
        self.queue.remove(0);
        items
    }
}

/// All workshop categories of a colony.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workshops {
    by_kind: BTreeMap<WorkshopKind, Workshop>,
}

impl Workshops {
    /// Create from explicit workshops.
    pub const fn new(by_kind: BTreeMap<WorkshopKind, Workshop>) -> Self {
        Self { by_kind }
    }

    /// The standard production table.
    pub fn standard() -> Self {
        let wood = |v| Some(CostInfo::new(ResourceKind::Wood, v));
        let iron = |v| Some(CostInfo::new(ResourceKind::Iron, v));
        let trap = |name: &str, kind: FurnitureKind| ProductionOption {
            trap: Some(kind),
            ..ProductionOption::new(name, ItemClass::Trap, wood(5), 10.0)
        };
        let mut by_kind = BTreeMap::new();
        by_kind.insert(
            WorkshopKind::Workshop,
            Workshop::new(vec![
                trap("boulder trap kit", FurnitureKind::BoulderTrap),
                trap("poison gas trap kit", FurnitureKind::PoisonGasTrap),
                trap("alarm trap kit", FurnitureKind::AlarmTrap),
                trap("surprise trap kit", FurnitureKind::SurpriseTrap),
                ProductionOption::new("wooden club", ItemClass::Weapon, wood(3), 8.0),
            ]),
        );
        by_kind.insert(
            WorkshopKind::Forge,
            Workshop::new(vec![
                ProductionOption::new("iron sword", ItemClass::Weapon, iron(10), 20.0),
                ProductionOption::new("chain mail", ItemClass::Armor, iron(15), 30.0),
                ProductionOption::new("automaton arm", ItemClass::AutomatonPart, iron(20), 40.0),
            ]),
        );
        by_kind.insert(
            WorkshopKind::Laboratory,
            Workshop::new(vec![ProductionOption::new(
                "healing potion",
                ItemClass::Potion,
                Some(CostInfo::new(ResourceKind::Mana, 5)),
                15.0,
            )]),
        );
        by_kind.insert(
            WorkshopKind::Jeweller,
            Workshop::new(vec![ProductionOption::new(
                "gold ring",
                ItemClass::Misc,
                Some(CostInfo::new(ResourceKind::Gold, 20)),
                25.0,
            )]),
        );
        Self { by_kind }
    }

    /// Workshop categories present.
    pub fn kinds(&self) -> Vec<WorkshopKind> {
        self.by_kind.keys().copied().collect()
    }

    /// One workshop.
    pub fn get(&self, kind: WorkshopKind) -> Option<&Workshop> {
        self.by_kind.get(&kind)
    }

    /// One workshop, mutably.
    pub fn get_mut(&mut self, kind: WorkshopKind) -> Option<&mut Workshop> {
        self.by_kind.get_mut(&kind)
    }

    /// Sum of unfunded queued costs in `kind` across workshops.
    pub fn debt(&self, kind: ResourceKind) -> i64 {
        self.by_kind
            .values()
            .fold(0_i64, |acc, w| acc.saturating_add(w.debt(kind)))
    }

    /// Make sure at least `count` items matching `wanted` are queued,
    /// queueing batches of the first matching option. Returns the number
    /// of batches queued.
    pub fn schedule_auto_production(
        &mut self,
        wanted: impl Fn(&ProductionOption) -> bool,
        count: u32,
    ) -> u32 {
        let mut missing = i64::from(count);
        for workshop in self.by_kind.values() {
            for queued in &workshop.queue {
                if workshop.options.get(queued.option).is_some_and(&wanted) {
                    let batch = workshop
                        .options
                        .get(queued.option)
                        .map_or(1, |o| o.batch_size);
                    missing = missing.saturating_sub(i64::from(batch));
                }
            }
        }
        if missing <= 0 {
            return 0;
        }
        for (kind, workshop) in &mut self.by_kind {
            let Some((index, option)) = workshop.options.iter().enumerate().find(|&(_, o)| wanted(o))
            else {
                continue;
            };
            let batch = i64::from(option.batch_size.max(1));
            let batches = missing
                .saturating_add(batch.saturating_sub(1))
                .checked_div(batch)
                .unwrap_or(0);
            let batches = u32::try_from(batches).unwrap_or(0);
            for _ in 0..batches {
                if workshop.queue(index).is_err() {
                    return 0;
                }
            }
            debug!(workshop = ?kind, batches, "auto production scheduled");
            return batches;
        }
        0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unfunded_queue_counts_as_debt() {
        let mut w = Workshops::standard();
        let forge = w.get_mut(WorkshopKind::Forge).unwrap();
        forge.queue(0).unwrap();
        forge.queue(1).unwrap();
        assert_eq!(w.debt(ResourceKind::Iron), 25);
        let forge = w.get_mut(WorkshopKind::Forge).unwrap();
        assert_eq!(forge.unfunded_head(), Some(CostInfo::new(ResourceKind::Iron, 10)));
        forge.fund_head();
        assert_eq!(w.debt(ResourceKind::Iron), 15);
    }

    #[test]
    fn work_only_advances_funded_head() {
        let mut w = Workshops::standard();
        let forge = w.get_mut(WorkshopKind::Forge).unwrap();
        forge.queue(0).unwrap();
        assert!(forge.add_work(100.0).is_empty());
        forge.fund_head();
        assert!(forge.add_work(10.0).is_empty());
        let items = forge.add_work(10.0);
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().class, ItemClass::Weapon);
        assert!(forge.queued().is_empty());
    }

    #[test]
    fn auto_production_queues_missing_traps_once() {
        let mut w = Workshops::standard();
        let wants_alarm = |o: &ProductionOption| o.trap == Some(FurnitureKind::AlarmTrap);
        assert_eq!(w.schedule_auto_production(wants_alarm, 2), 2);
        assert_eq!(w.schedule_auto_production(wants_alarm, 2), 0);
        assert_eq!(w.get(WorkshopKind::Workshop).unwrap().queued().len(), 2);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut w = Workshops::standard();
        let lab = w.get_mut(WorkshopKind::Laboratory).unwrap();
        assert!(matches!(lab.queue(7), Err(TaskError::UnknownOption(7))));
    }
}
