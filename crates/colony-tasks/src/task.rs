//! Tasks and the actions they carry.
//!
//! Actions are opaque to the queue: it stores them and hands them back to
//! whoever executes tasks. Movement and pathfinding behind an action live
//! outside the colony.

use serde::{Deserialize, Serialize};

use colony_types::{
    AgentId, DestroyKind, FurnitureKind, ItemId, MinionActivity, Position, StorageKind, TaskId,
};

/// What a task asks its executor to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskAction {
    /// Build planned furniture at the task position.
    Construction {
        /// Furniture to build.
        furniture: FurnitureKind,
    },
    /// Remove furniture at the task position.
    Destruction {
        /// How it is removed.
        kind: DestroyKind,
        /// Furniture being removed.
        furniture: FurnitureKind,
    },
    /// Walk to the position and stay for a while.
    GoToAndWait {
        /// Ticks to wait.
        duration: u64,
    },
    /// Pick items up at the task position.
    PickUp {
        /// Items to carry.
        items: Vec<ItemId>,
    },
    /// Drop carried items at the task position.
    Drop {
        /// Items to drop.
        items: Vec<ItemId>,
        /// Storage being filled.
        storage: StorageKind,
    },
    /// Carry a trap kit to `target` and apply it.
    ApplyTrap {
        /// Trap kit.
        item: ItemId,
        /// Where the trap goes.
        target: Position,
    },
    /// Install an automaton part into `agent`.
    InstallPart {
        /// Receiving automaton.
        agent: AgentId,
        /// Part to install.
        item: ItemId,
    },
    /// Whip `agent` at a whipping post.
    Whipping {
        /// Victim.
        agent: AgentId,
    },
    /// Torture `agent` at a torture table.
    Torture {
        /// Victim.
        agent: AgentId,
    },
    /// Execute `agent` at the gallows.
    Execute {
        /// Victim.
        agent: AgentId,
    },
    /// Take a banished automaton apart.
    Disassemble {
        /// Automaton.
        agent: AgentId,
    },
    /// Several actions performed in order.
    Chain(Vec<TaskAction>),
}

impl TaskAction {
    /// Short human-readable description.
    pub fn describe(&self) -> String {
        match self {
            Self::Construction { furniture } => format!("build {furniture:?}"),
            Self::Destruction { kind, furniture } => format!("{kind:?} {furniture:?}"),
            Self::GoToAndWait { duration } => format!("guard for {duration}"),
            Self::PickUp { items } => format!("pick up {} items", items.len()),
            Self::Drop { items, storage } => format!("store {} items in {storage:?}", items.len()),
            Self::ApplyTrap { target, .. } => format!("set trap at {target}"),
            Self::InstallPart { agent, .. } => format!("install part into {agent}"),
            Self::Whipping { agent } => format!("whip {agent}"),
            Self::Torture { agent } => format!("torture {agent}"),
            Self::Execute { agent } => format!("execute {agent}"),
            Self::Disassemble { agent } => format!("disassemble {agent}"),
            Self::Chain(parts) => parts
                .iter()
                .map(Self::describe)
                .collect::<Vec<_>>()
                .join(", then "),
        }
    }
}

/// A queued task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id.
    pub id: TaskId,
    /// What to do.
    pub action: TaskAction,
    /// Where it happens.
    pub position: Position,
    /// Activity category serving it.
    pub activity: MinionActivity,
    /// Preferred by task selection.
    pub priority: bool,
    /// Finished; swept on the next queue tick.
    pub done: bool,
    /// Its target condition vanished; removed lazily when discovered.
    pub bogus: bool,
    /// Created for one specific agent.
    pub for_agent: Option<AgentId>,
}

impl Task {
    /// A fresh, unassigned task.
    pub fn new(action: TaskAction, position: Position, activity: MinionActivity) -> Self {
        Self {
            id: TaskId::new(),
            action,
            position,
            activity,
            priority: false,
            done: false,
            bogus: false,
            for_agent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_description_joins_parts() {
        let action = TaskAction::Chain(vec![
            TaskAction::PickUp { items: vec![ItemId::new()] },
            TaskAction::GoToAndWait { duration: 5 },
        ]);
        assert_eq!(action.describe(), "pick up 1 items, then guard for 5");
    }
}
