//! Game events and the event bus.
//!
//! Events are a closed sum type. The world publishes combat and structure
//! events; colonies publish conquest and danger escalation. The bus is a
//! FIFO queue: events are delivered in emission order, each to every
//! subscribed colony, and events emitted while handling are appended
//! behind the ones already queued.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use colony_types::{AgentId, ColonyId, FurnitureKind, FurnitureLayer, Position};

/// Something that happened in the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An alarm went off.
    Alarm {
        /// Where.
        pos: Position,
        /// No message for the player.
        silent: bool,
    },
    /// A creature died.
    CreatureKilled {
        /// The dead creature.
        victim: AgentId,
        /// The killer, if any.
        attacker: Option<AgentId>,
    },
    /// A creature was knocked out and can be captured.
    CreatureStunned {
        /// The stunned creature.
        victim: AgentId,
        /// Who knocked it out.
        attacker: Option<AgentId>,
    },
    /// A torture session advanced.
    CreatureTortured {
        /// The tortured creature.
        victim: AgentId,
        /// The torturer.
        torturer: AgentId,
    },
    /// A trap went off.
    TrapTriggered {
        /// Trap position.
        pos: Position,
    },
    /// A trap was disarmed by an intruder.
    TrapDisarmed {
        /// Trap position.
        pos: Position,
        /// The disarming creature.
        disarmer: AgentId,
    },
    /// Furniture was destroyed in the world.
    FurnitureDestroyed {
        /// Position.
        pos: Position,
        /// Layer.
        layer: FurnitureLayer,
        /// Destroyed kind.
        kind: FurnitureKind,
    },
    /// A colony lost its last fighter or leader.
    ConqueredEnemy {
        /// The conquered colony.
        colony: ColonyId,
        /// Its display name.
        name: String,
    },
    /// A colony's danger level crossed an escalation threshold.
    DangerEscalated {
        /// The colony.
        colony: ColonyId,
        /// New danger level.
        level: u32,
    },
}

impl GameEvent {
    /// Short name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Alarm { .. } => "alarm",
            Self::CreatureKilled { .. } => "creature_killed",
            Self::CreatureStunned { .. } => "creature_stunned",
            Self::CreatureTortured { .. } => "creature_tortured",
            Self::TrapTriggered { .. } => "trap_triggered",
            Self::TrapDisarmed { .. } => "trap_disarmed",
            Self::FurnitureDestroyed { .. } => "furniture_destroyed",
            Self::ConqueredEnemy { .. } => "conquered_enemy",
            Self::DangerEscalated { .. } => "danger_escalated",
        }
    }
}

/// FIFO queue of undelivered events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBus {
    queue: VecDeque<GameEvent>,
    published: u64,
}

impl EventBus {
    /// Empty bus.
    pub const fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            published: 0,
        }
    }

    /// Queue one event.
    pub fn publish(&mut self, event: GameEvent) {
        self.published = self.published.saturating_add(1);
        self.queue.push_back(event);
    }

    /// Queue several events, keeping their order.
    pub fn publish_all(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Next event to deliver.
    pub fn next_event(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    /// Undelivered events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Events published since creation.
    pub const fn published(&self) -> u64 {
        self.published
    }
}
