//! Task scheduling for a colony.
//!
//! # Modules
//!
//! - [`task`] -- [`Task`] and the opaque [`TaskAction`] it carries.
//! - [`queue`] -- The [`TaskQueue`]: ordering, assignment, cost reservation.
//! - [`workshop`] -- Workshop production queues.

pub mod queue;
pub mod task;
pub mod workshop;

pub use queue::TaskQueue;
pub use task::{Task, TaskAction};
pub use workshop::{ProductionOption, QueuedItem, Workshop, Workshops};

use colony_types::{AgentId, Position, TaskId};

/// Errors raised by the task queue and workshops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// No task with this id.
    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    /// The agent already holds a task.
    #[error("agent {agent} already holds task {task}")]
    AgentBusy {
        /// Agent.
        agent: AgentId,
        /// Task it holds.
        task: TaskId,
    },

    /// The task is held by, or reserved for, another agent.
    #[error("task {task} is taken by {agent}")]
    TaskTaken {
        /// Task.
        task: TaskId,
        /// Current holder.
        agent: AgentId,
    },

    /// The square already carries a marked task.
    #[error("square {pos} is already marked by task {task}")]
    AlreadyMarked {
        /// Square.
        pos: Position,
        /// Existing task.
        task: TaskId,
    },

    /// The agent does not hold the task.
    #[error("agent {agent} does not hold task {task}")]
    NotHolder {
        /// Task.
        task: TaskId,
        /// Agent that claimed to hold it.
        agent: AgentId,
    },

    /// No production option with this index.
    #[error("unknown production option {0}")]
    UnknownOption(usize),
}
