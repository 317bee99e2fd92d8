//! The colony's task queue.
//!
//! # Design
//!
//! - **No de-duplication**: [`TaskQueue::add_task`] always inserts. Callers
//!   check [`TaskQueue::has_task_at`] first.
//! - **Costs are reported, never refunded**: removing or freeing a task
//!   returns its reserved [`CostInfo`]; the caller hands it back to the
//!   ledger so that refund policy lives in one place.
//! - **Ordering**: insertion order per activity, with priority tasks served
//!   first. Nothing else reorders the queue.
//! - **Lazy sweeping**: completed tasks stay until the next
//!   [`TaskQueue::tick`]; bogus tasks stay until someone discovers them.

use std::collections::BTreeMap;

use tracing::debug;

use colony_types::{
    AgentId, CostInfo, HighlightKind, MinionActivity, Position, ResourceKind, TaskId,
};

use crate::TaskError;
use crate::task::{Task, TaskAction};

/// Pending tasks of one colony.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: BTreeMap<TaskId, Task>,
    order: Vec<TaskId>,
    costs: BTreeMap<TaskId, CostInfo>,
    assignment: BTreeMap<AgentId, TaskId>,
    holder: BTreeMap<TaskId, AgentId>,
    marked: BTreeMap<Position, (TaskId, HighlightKind)>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            order: Vec::new(),
            costs: BTreeMap::new(),
            assignment: BTreeMap::new(),
            holder: BTreeMap::new(),
            marked: BTreeMap::new(),
        }
    }

    fn insert(&mut self, task: Task) -> TaskId {
        let id = task.id;
        debug!(task = %id, action = task.action.describe(), pos = %task.position, "task added");
        self.order.push(id);
        self.tasks.insert(id, task);
        id
    }

    // -- creation -----------------------------------------------------------

    /// Queue a task.
    pub fn add_task(
        &mut self,
        action: TaskAction,
        position: Position,
        activity: MinionActivity,
    ) -> TaskId {
        self.insert(Task::new(action, position, activity))
    }

    /// Queue a task that carries a reserved cost. The cost counts as funded
    /// until the task is done or removed.
    pub fn add_task_cost(
        &mut self,
        action: TaskAction,
        position: Position,
        cost: CostInfo,
        activity: MinionActivity,
    ) -> TaskId {
        let id = self.add_task(action, position, activity);
        if !cost.is_free() {
            self.costs.insert(id, cost);
        }
        id
    }

    /// Queue a task already assigned to `agent`.
    ///
    /// # Errors
    ///
    /// [`TaskError::AgentBusy`] if `agent` holds another task.
    pub fn add_task_for(
        &mut self,
        action: TaskAction,
        position: Position,
        activity: MinionActivity,
        agent: AgentId,
    ) -> Result<TaskId, TaskError> {
        if let Some(task) = self.assignment.get(&agent) {
            return Err(TaskError::AgentBusy { agent, task: *task });
        }
        let mut task = Task::new(action, position, activity);
        task.for_agent = Some(agent);
        let id = self.insert(task);
        self.assignment.insert(agent, id);
        self.holder.insert(id, agent);
        Ok(id)
    }

    /// Queue a task tied to a highlighted square.
    ///
    /// # Errors
    ///
    /// [`TaskError::AlreadyMarked`] if the square carries a task already.
    pub fn mark_square(
        &mut self,
        position: Position,
        highlight: HighlightKind,
        action: TaskAction,
        activity: MinionActivity,
        bogus: bool,
    ) -> Result<TaskId, TaskError> {
        if let Some((task, _)) = self.marked.get(&position) {
            return Err(TaskError::AlreadyMarked {
                pos: position,
                task: *task,
            });
        }
        let mut task = Task::new(action, position, activity);
        task.bogus = bogus;
        let id = self.insert(task);
        self.marked.insert(position, (id, highlight));
        Ok(id)
    }

    // -- assignment ---------------------------------------------------------

    /// Give `task` to `agent`.
    ///
    /// # Errors
    ///
    /// [`TaskError::UnknownTask`], [`TaskError::AgentBusy`] or
    /// [`TaskError::TaskTaken`].
    pub fn claim(&mut self, agent: AgentId, task: TaskId) -> Result<(), TaskError> {
        let entry = self.tasks.get(&task).ok_or(TaskError::UnknownTask(task))?;
        if let Some(current) = self.assignment.get(&agent) {
            return Err(TaskError::AgentBusy {
                agent,
                task: *current,
            });
        }
        if let Some(other) = self.holder.get(&task) {
            return Err(TaskError::TaskTaken {
                task,
                agent: *other,
            });
        }
        if entry.done || entry.for_agent.is_some_and(|a| a != agent) {
            return Err(TaskError::TaskTaken {
                task,
                agent: entry.for_agent.unwrap_or(agent),
            });
        }
        self.assignment.insert(agent, task);
        self.holder.insert(task, agent);
        Ok(())
    }

    /// Detach `agent` from its task.
    ///
    /// A task that carries a cost, or that was created for this agent, is
    /// cancelled and its cost returned. Any other task goes back to the
    /// pool and the returned cost is zero. Freeing an agent without a task
    /// is a no-op returning zero.
    pub fn free_from_task(&mut self, agent: AgentId) -> CostInfo {
        let Some(task) = self.assignment.remove(&agent) else {
            return CostInfo::free();
        };
        self.holder.remove(&task);
        let cancel = self.costs.contains_key(&task)
            || self
                .tasks
                .get(&task)
                .is_some_and(|t| t.for_agent == Some(agent));
        if cancel {
            self.remove_task(task)
        } else {
            CostInfo::free()
        }
    }

    /// Cancel `task` outright and return its reserved cost. Unknown tasks
    /// and completed tasks return zero.
    pub fn remove_task(&mut self, task: TaskId) -> CostInfo {
        let Some(removed) = self.tasks.remove(&task) else {
            return CostInfo::free();
        };
        self.order.retain(|t| *t != task);
        if let Some(agent) = self.holder.remove(&task) {
            self.assignment.remove(&agent);
        }
        self.marked.retain(|_, (t, _)| *t != task);
        let cost = self.costs.remove(&task).unwrap_or_default();
        debug!(task = %task, refund = cost.value, "task removed");
        if removed.done { CostInfo::free() } else { cost }
    }

    /// Mark `task` done. Its cost is consumed and the task is swept on the
    /// next [`TaskQueue::tick`].
    ///
    /// # Errors
    ///
    /// [`TaskError::UnknownTask`] if the task does not exist.
    pub fn complete(&mut self, task: TaskId) -> Result<Task, TaskError> {
        let entry = self.tasks.get_mut(&task).ok_or(TaskError::UnknownTask(task))?;
        entry.done = true;
        let snapshot = entry.clone();
        if let Some(agent) = self.holder.remove(&task) {
            self.assignment.remove(&agent);
        }
        self.marked.retain(|_, (t, _)| *t != task);
        Ok(snapshot)
    }

    /// Sweep completed tasks. Returns how many were removed.
    pub fn tick(&mut self) -> usize {
        let done: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|t| t.done)
            .map(|t| t.id)
            .collect();
        for id in &done {
            self.tasks.remove(id);
            self.costs.remove(id);
        }
        self.order.retain(|t| !done.contains(t));
        done.len()
    }

    // -- queries ------------------------------------------------------------

    /// The task with this id.
    pub fn task(&self, task: TaskId) -> Option<&Task> {
        self.tasks.get(&task)
    }

    /// The task held by `agent`.
    pub fn task_of(&self, agent: AgentId) -> Option<TaskId> {
        self.assignment.get(&agent).copied()
    }

    /// Whether `agent` holds a task.
    pub fn has_task(&self, agent: AgentId) -> bool {
        self.assignment.contains_key(&agent)
    }

    /// The agent holding `task`.
    pub fn holder_of(&self, task: TaskId) -> Option<AgentId> {
        self.holder.get(&task).copied()
    }

    /// Position of `task`.
    pub fn position_of(&self, task: TaskId) -> Option<Position> {
        self.tasks.get(&task).map(|t| t.position)
    }

    /// Reserved cost of `task`.
    pub fn completion_cost(&self, task: TaskId) -> Option<CostInfo> {
        self.costs.get(&task).copied()
    }

    /// Sum of reserved costs in `kind` over tasks that are not done.
    pub fn funded_cost(&self, kind: ResourceKind) -> i64 {
        self.costs
            .iter()
            .filter(|(id, c)| c.kind == kind && self.tasks.get(id).is_some_and(|t| !t.done))
            .fold(0_i64, |acc, (_, c)| acc.saturating_add(c.value))
    }

    /// Whether a live task of `activity` exists at `pos`.
    pub fn has_task_at(&self, pos: Position, activity: MinionActivity) -> bool {
        self.tasks
            .values()
            .any(|t| t.position == pos && t.activity == activity && !t.done)
    }

    /// Live tasks of `activity` in insertion order.
    pub fn tasks_of(&self, activity: MinionActivity) -> Vec<TaskId> {
        self.order
            .iter()
            .filter(|id| {
                self.tasks
                    .get(id)
                    .is_some_and(|t| t.activity == activity && !t.done)
            })
            .copied()
            .collect()
    }

    /// First unclaimed task of `activity` that `agent` may take and
    /// `accept` approves. Priority tasks come first, then insertion order.
    pub fn first_available(
        &self,
        agent: AgentId,
        activity: MinionActivity,
        mut accept: impl FnMut(&Task) -> bool,
    ) -> Option<TaskId> {
        let candidates = self.order.iter().filter_map(|id| self.tasks.get(id)).filter(|t| {
            t.activity == activity
                && !t.done
                && !t.bogus
                && !self.holder.contains_key(&t.id)
                && t.for_agent.is_none_or(|a| a == agent)
        });
        let mut fallback = None;
        for task in candidates {
            if !accept(task) {
                continue;
            }
            if task.priority {
                return Some(task.id);
            }
            if fallback.is_none() {
                fallback = Some(task.id);
            }
        }
        fallback
    }

    /// Number of unclaimed live tasks of `activity`.
    pub fn unclaimed_count(&self, activity: MinionActivity) -> usize {
        self.tasks
            .values()
            .filter(|t| {
                t.activity == activity && !t.done && !t.bogus && !self.holder.contains_key(&t.id)
            })
            .count()
    }

    /// The task tied to a highlighted square.
    pub fn marked(&self, pos: Position) -> Option<TaskId> {
        self.marked.get(&pos).map(|(t, _)| *t)
    }

    /// Highlight of a marked square.
    pub fn highlight(&self, pos: Position) -> Option<HighlightKind> {
        self.marked.get(&pos).map(|(_, h)| *h)
    }

    /// Prefer every task at `pos`.
    pub fn set_priority_tasks(&mut self, pos: Position) {
        for task in self.tasks.values_mut().filter(|t| t.position == pos) {
            task.priority = true;
        }
    }

    /// Whether any task at `pos` is preferred.
    pub fn has_priority_tasks(&self, pos: Position) -> bool {
        self.tasks.values().any(|t| t.position == pos && t.priority)
    }

    /// Number of tasks, including completed ones not yet swept.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the queue holds nothing.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
