//! The controller seam.
//!
//! A colony is driven by a controller: the player's interface, a villain
//! AI or, in headless runs, a scripted stand-in. The controller decides
//! what members do between colony ticks; the colony tells it what
//! happened through [`Notice`]s.
//!
//! Two controllers ship with the crate:
//!
//! - [`AutoControl`] keeps members busy with a fixed preference list per
//!   trait and carries out claimed tasks on the following tick.
//! - [`PassiveControl`] does nothing, for colonies that only react.

use serde::Serialize;
use tracing::debug;

use colony_agents::{TaskSource, task_source};
use colony_types::{AgentId, FurnitureKind, MinionActivity, MinionTrait, PlayerMessage, Position};

use crate::colony::Colony;
use crate::error::ColonyError;
use crate::world::Env;

/// Something the controller should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// A message for the player.
    Message(PlayerMessage),
    /// A creature joined.
    MemberAdded {
        /// The new member.
        agent: AgentId,
    },
    /// A member died.
    MemberKilled {
        /// The dead member.
        victim: AgentId,
        /// Its killer, if any.
        killer: Option<AgentId>,
    },
    /// The colony was conquered.
    Conquered {
        /// The last fighter or leader to fall.
        victim: AgentId,
        /// Who brought it down.
        killer: Option<AgentId>,
    },
    /// A square joined the territory.
    ClaimedSquare {
        /// The square.
        pos: Position,
    },
    /// Furniture was built.
    Constructed {
        /// Where.
        pos: Position,
        /// What.
        kind: FurnitureKind,
    },
}

/// Drives a colony between its ticks.
pub trait ColonyControl {
    /// Decide and act for this tick, before the colony's own tick runs.
    ///
    /// # Errors
    ///
    /// Propagates contract violations from the colony operations used.
    fn tick(&mut self, colony: &mut Colony, env: &mut Env<'_>) -> Result<(), ColonyError>;

    /// React to a notice from the colony.
    fn on_notice(&mut self, colony: &Colony, notice: &Notice) {
        let _ = (colony, notice);
    }
}

/// A controller that never acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveControl;

impl ColonyControl for PassiveControl {
    fn tick(&mut self, _colony: &mut Colony, _env: &mut Env<'_>) -> Result<(), ColonyError> {
        Ok(())
    }
}

/// Scripted controller for headless runs.
///
/// Every member holding a task completes it. Idle members take up the
/// first activity of their preference list the colony considers good.
/// Members with an activity claim a queued task for it, or apply a piece
/// of furniture serving it when nothing is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoControl {
    preferences: Vec<(MinionTrait, Vec<MinionActivity>)>,
    notices_seen: u64,
}

impl AutoControl {
    /// Workers build, dig, haul and work; fighters guard and train;
    /// leaders pray and write.
    pub fn new() -> Self {
        use MinionActivity as A;
        Self {
            preferences: vec![
                (MinionTrait::Leader, vec![A::Ritual, A::Poetry, A::Sleep]),
                (
                    MinionTrait::Fighter,
                    vec![A::Guarding, A::Train, A::Archery, A::Study, A::Sleep],
                ),
                (
                    MinionTrait::Worker,
                    vec![A::Construction, A::Digging, A::Hauling, A::Working, A::Craft],
                ),
            ],
            notices_seen: 0,
        }
    }

    /// Replace the preference list of members with trait `t`. Traits are
    /// checked in insertion order; the first one a member has wins.
    #[must_use]
    pub fn with_preferences(mut self, t: MinionTrait, activities: Vec<MinionActivity>) -> Self {
        if let Some(slot) = self.preferences.iter_mut().find(|(p, _)| *p == t) {
            slot.1 = activities;
        } else {
            self.preferences.push((t, activities));
        }
        self
    }

    /// Notices received so far.
    pub const fn notices_seen(&self) -> u64 {
        self.notices_seen
    }

    fn preferences_of(&self, colony: &Colony, agent: AgentId) -> &[MinionActivity] {
        self.preferences
            .iter()
            .find(|(t, _)| colony.roster().has_trait(agent, *t))
            .map(|(_, list)| list.as_slice())
            .unwrap_or_default()
    }
}

impl Default for AutoControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ColonyControl for AutoControl {
    fn tick(&mut self, colony: &mut Colony, env: &mut Env<'_>) -> Result<(), ColonyError> {
        let members = colony.roster().members().to_vec();
        for agent in members {
            if !colony.roster().contains(agent) {
                continue;
            }
            if let Some(task) = colony.tasks().task_of(agent) {
                colony.complete_task(agent, task, env)?;
                continue;
            }
            let mut activity = colony.roster().current_activity(agent).activity;
            if activity == MinionActivity::Idle {
                let next = self
                    .preferences_of(colony, agent)
                    .iter()
                    .copied()
                    .find(|a| colony.is_activity_good(agent, *a, false, env));
                let Some(next) = next else {
                    continue;
                };
                colony.set_minion_activity(agent, next, env)?;
                activity = next;
            }
            if task_source(activity) == TaskSource::Always {
                continue;
            }
            let now = env.now;
            let queued = colony
                .tasks()
                .first_available(agent, activity, |t| !colony.is_delayed(t.position, now));
            if let Some(task) = queued {
                colony.claim_task(agent, task)?;
                debug!(agent = %agent, task = %task, ?activity, "task claimed");
            } else if task_source(activity) == TaskSource::Furniture {
                if let Some(pos) = colony.furniture_for(activity).first().copied() {
                    colony.on_applied_square(agent, pos, env)?;
                }
            }
        }
        Ok(())
    }

    fn on_notice(&mut self, _colony: &Colony, _notice: &Notice) {
        self.notices_seen = self.notices_seen.saturating_add(1);
    }
}
