//! Planned and built furniture, and trap plans, per position.
//!
//! # Invariants
//!
//! - At most one [`FurniturePlan`] exists per `(position, layer)`;
//!   [`ConstructionRegistry::add_furniture`] rejects a second one.
//! - A plan moves Planned -> `TaskAssigned` -> Built, or is removed before
//!   it is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use colony_types::{CostInfo, FurnitureKind, FurnitureLayer, Position, ResourceKind, TaskId};

use crate::SiteError;

/// Lifecycle stage of a furniture plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanState {
    /// Waiting for funds or reachability.
    Planned,
    /// Funded; a construction task exists.
    TaskAssigned(TaskId),
    /// Standing in the world.
    Built,
}

/// One planned or built piece of furniture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurniturePlan {
    /// Furniture kind.
    pub kind: FurnitureKind,
    /// Construction cost.
    pub cost: CostInfo,
    /// Lifecycle stage.
    pub state: PlanState,
}

impl FurniturePlan {
    /// A fresh plan.
    pub const fn planned(kind: FurnitureKind, cost: CostInfo) -> Self {
        Self {
            kind,
            cost,
            state: PlanState::Planned,
        }
    }

    /// A record for furniture that already stands.
    pub const fn built(kind: FurnitureKind) -> Self {
        Self {
            kind,
            cost: CostInfo::free(),
            state: PlanState::Built,
        }
    }

    /// Whether it stands.
    pub const fn is_built(&self) -> bool {
        matches!(self.state, PlanState::Built)
    }

    /// The construction task, if funded.
    pub const fn task(&self) -> Option<TaskId> {
        match self.state {
            PlanState::TaskAssigned(t) => Some(t),
            PlanState::Planned | PlanState::Built => None,
        }
    }
}

/// One planned trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapPlan {
    /// Trap furniture kind.
    pub kind: FurnitureKind,
    /// A trap kit has been applied.
    pub armed: bool,
    /// A placement task exists.
    pub marked: bool,
}

impl TrapPlan {
    /// A fresh, unarmed trap plan.
    pub const fn new(kind: FurnitureKind) -> Self {
        Self {
            kind,
            armed: false,
            marked: false,
        }
    }

    /// Back to unarmed and unmarked (after being disarmed).
    pub const fn reset(&mut self) {
        self.armed = false;
        self.marked = false;
    }
}

/// The registry of one colony.
#[derive(Debug, Clone, Default)]
pub struct ConstructionRegistry {
    furniture: BTreeMap<(Position, FurnitureLayer), FurniturePlan>,
    traps: BTreeMap<Position, TrapPlan>,
}

impl ConstructionRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            furniture: BTreeMap::new(),
            traps: BTreeMap::new(),
        }
    }

    // -- furniture ----------------------------------------------------------

    /// Record a plan at `(pos, layer)`.
    ///
    /// # Errors
    ///
    /// [`SiteError::DuplicatePlan`] if a plan already exists there.
    pub fn add_furniture(
        &mut self,
        pos: Position,
        layer: FurnitureLayer,
        plan: FurniturePlan,
    ) -> Result<(), SiteError> {
        if self.furniture.contains_key(&(pos, layer)) {
            return Err(SiteError::DuplicatePlan { pos, layer });
        }
        self.furniture.insert((pos, layer), plan);
        Ok(())
    }

    /// The plan at `(pos, layer)`.
    pub fn furniture(&self, pos: Position, layer: FurnitureLayer) -> Option<&FurniturePlan> {
        self.furniture.get(&(pos, layer))
    }

    /// Whether a plan exists at `(pos, layer)`.
    pub fn contains_furniture(&self, pos: Position, layer: FurnitureLayer) -> bool {
        self.furniture.contains_key(&(pos, layer))
    }

    /// Remove and return the plan at `(pos, layer)`.
    pub fn remove_furniture_plan(
        &mut self,
        pos: Position,
        layer: FurnitureLayer,
    ) -> Option<FurniturePlan> {
        self.furniture.remove(&(pos, layer))
    }

    /// Attach a construction task to an unbuilt plan.
    ///
    /// # Errors
    ///
    /// [`SiteError::UnknownPlan`] if there is no plan, or
    /// [`SiteError::AlreadyBuilt`] if it already stands.
    pub fn set_task(
        &mut self,
        pos: Position,
        layer: FurnitureLayer,
        task: TaskId,
    ) -> Result<(), SiteError> {
        let plan = self
            .furniture
            .get_mut(&(pos, layer))
            .ok_or(SiteError::UnknownPlan { pos, layer })?;
        if plan.is_built() {
            return Err(SiteError::AlreadyBuilt { pos, layer });
        }
        plan.state = PlanState::TaskAssigned(task);
        Ok(())
    }

    /// Detach the task from a funded plan, returning it to Planned.
    pub fn clear_task(&mut self, pos: Position, layer: FurnitureLayer) {
        if let Some(plan) = self.furniture.get_mut(&(pos, layer)) {
            if plan.task().is_some() {
                plan.state = PlanState::Planned;
            }
        }
    }

    /// Mark the plan of `kind` at `pos` built. Furniture found without a plan
    /// is recorded as built.
    pub fn on_constructed(&mut self, pos: Position, layer: FurnitureLayer, kind: FurnitureKind) {
        self.furniture
            .entry((pos, layer))
            .and_modify(|p| {
                p.kind = kind;
                p.state = PlanState::Built;
            })
            .or_insert_with(|| FurniturePlan::built(kind));
    }

    /// Forget built furniture that was destroyed in the world.
    pub fn on_furniture_destroyed(
        &mut self,
        pos: Position,
        layer: FurnitureLayer,
        kind: FurnitureKind,
    ) -> bool {
        let matches = self
            .furniture
            .get(&(pos, layer))
            .is_some_and(|p| p.kind == kind && p.is_built());
        if matches {
            self.furniture.remove(&(pos, layer));
        }
        matches
    }

    /// All plan keys in position order.
    pub fn all_furniture(&self) -> Vec<(Position, FurnitureLayer)> {
        self.furniture.keys().copied().collect()
    }

    /// Number of built pieces of `kind`.
    pub fn built_count(&self, kind: FurnitureKind) -> usize {
        self.furniture
            .values()
            .filter(|p| p.kind == kind && p.is_built())
            .count()
    }

    /// Positions of built pieces of `kind`.
    pub fn built_positions(&self, kind: FurnitureKind) -> Vec<Position> {
        self.furniture
            .iter()
            .filter(|(_, p)| p.kind == kind && p.is_built())
            .map(|((pos, _), _)| *pos)
            .collect()
    }

    /// Sum of costs of unbuilt plans paying in `kind`.
    pub fn debt(&self, kind: ResourceKind) -> i64 {
        self.furniture
            .values()
            .filter(|p| !p.is_built() && p.cost.kind == kind)
            .fold(0_i64, |acc, p| acc.saturating_add(p.cost.value))
    }

    /// Remove unbuilt plans for which `supported` is false. Returns the
    /// removed plans so the caller can cancel their tasks.
    pub fn clear_unsupported_plans(
        &mut self,
        mut supported: impl FnMut(Position, FurnitureKind) -> bool,
    ) -> Vec<(Position, FurnitureLayer, FurniturePlan)> {
        let doomed: Vec<(Position, FurnitureLayer)> = self
            .furniture
            .iter()
            .filter(|((pos, _), p)| !p.is_built() && !supported(*pos, p.kind))
            .map(|(key, _)| *key)
            .collect();
        doomed
            .into_iter()
            .filter_map(|(pos, layer)| {
                self.furniture
                    .remove(&(pos, layer))
                    .map(|plan| (pos, layer, plan))
            })
            .collect()
    }

    // -- traps --------------------------------------------------------------

    /// Record a trap plan at `pos`.
    ///
    /// # Errors
    ///
    /// [`SiteError::DuplicateTrap`] if one exists already.
    pub fn add_trap(&mut self, pos: Position, kind: FurnitureKind) -> Result<(), SiteError> {
        if self.traps.contains_key(&pos) {
            return Err(SiteError::DuplicateTrap { pos });
        }
        self.traps.insert(pos, TrapPlan::new(kind));
        Ok(())
    }

    /// The trap plan at `pos`.
    pub fn trap(&self, pos: Position) -> Option<&TrapPlan> {
        self.traps.get(&pos)
    }

    /// Mutable trap plan at `pos`.
    pub fn trap_mut(&mut self, pos: Position) -> Option<&mut TrapPlan> {
        self.traps.get_mut(&pos)
    }

    /// Remove the trap plan at `pos`.
    pub fn remove_trap(&mut self, pos: Position) -> Option<TrapPlan> {
        self.traps.remove(&pos)
    }

    /// All trap positions.
    pub fn all_traps(&self) -> Vec<Position> {
        self.traps.keys().copied().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const P: Position = Position::new(0, 3, 4);

    fn wood(v: i64) -> CostInfo {
        CostInfo::new(ResourceKind::Wood, v)
    }

    #[test]
    fn one_plan_per_position_and_layer() {
        let mut r = ConstructionRegistry::new();
        r.add_furniture(P, FurnitureLayer::Middle, FurniturePlan::planned(FurnitureKind::Bed, wood(6)))
            .unwrap();
        let err = r
            .add_furniture(P, FurnitureLayer::Middle, FurniturePlan::planned(FurnitureKind::Door, wood(5)))
            .unwrap_err();
        assert!(matches!(err, SiteError::DuplicatePlan { .. }));
        r.add_furniture(P, FurnitureLayer::Floor, FurniturePlan::planned(FurnitureKind::WoodFloor, wood(2)))
            .unwrap();
        assert_eq!(r.all_furniture().len(), 2);
    }

    #[test]
    fn lifecycle_planned_task_built() {
        let mut r = ConstructionRegistry::new();
        r.add_furniture(P, FurnitureLayer::Middle, FurniturePlan::planned(FurnitureKind::Bed, wood(6)))
            .unwrap();
        assert_eq!(r.debt(ResourceKind::Wood), 6);
        let task = TaskId::new();
        r.set_task(P, FurnitureLayer::Middle, task).unwrap();
        assert_eq!(r.furniture(P, FurnitureLayer::Middle).unwrap().task(), Some(task));
        r.on_constructed(P, FurnitureLayer::Middle, FurnitureKind::Bed);
        assert!(r.furniture(P, FurnitureLayer::Middle).unwrap().is_built());
        assert_eq!(r.debt(ResourceKind::Wood), 0);
        assert_eq!(r.built_count(FurnitureKind::Bed), 1);
        assert_eq!(r.built_positions(FurnitureKind::Bed), vec![P]);
        assert!(r.set_task(P, FurnitureLayer::Middle, TaskId::new()).is_err());
    }

    #[test]
    fn clear_task_returns_to_planned() {
        let mut r = ConstructionRegistry::new();
        r.add_furniture(P, FurnitureLayer::Middle, FurniturePlan::planned(FurnitureKind::Bed, wood(6)))
            .unwrap();
        r.set_task(P, FurnitureLayer::Middle, TaskId::new()).unwrap();
        r.clear_task(P, FurnitureLayer::Middle);
        assert_eq!(r.furniture(P, FurnitureLayer::Middle).unwrap().state, PlanState::Planned);
    }

    #[test]
    fn unsupported_unbuilt_plans_are_cleared() {
        let mut r = ConstructionRegistry::new();
        let q = Position::new(0, 9, 9);
        r.add_furniture(P, FurnitureLayer::Middle, FurniturePlan::planned(FurnitureKind::Bed, wood(6)))
            .unwrap();
        r.add_furniture(q, FurnitureLayer::Middle, FurniturePlan::built(FurnitureKind::Door))
            .unwrap();
        let removed = r.clear_unsupported_plans(|_, _| false);
        assert_eq!(removed.len(), 1);
        assert!(r.contains_furniture(q, FurnitureLayer::Middle));
    }

    #[test]
    fn trap_reset_clears_flags() {
        let mut r = ConstructionRegistry::new();
        r.add_trap(P, FurnitureKind::AlarmTrap).unwrap();
        assert!(r.add_trap(P, FurnitureKind::BoulderTrap).is_err());
        let trap = r.trap_mut(P).unwrap();
        trap.armed = true;
        trap.marked = true;
        trap.reset();
        assert_eq!(*r.trap(P).unwrap(), TrapPlan::new(FurnitureKind::AlarmTrap));
    }
}
