//! Current activities and where their tasks come from.

use serde::{Deserialize, Serialize};

use colony_types::MinionActivity;

/// A member's activity and when it runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentActivity {
    /// The activity.
    pub activity: MinionActivity,
    /// Tick after which the activity is over; `None` runs until changed.
    pub finish_time: Option<u64>,
}

impl CurrentActivity {
    /// Idle, open-ended.
    pub const fn idle() -> Self {
        Self {
            activity: MinionActivity::Idle,
            finish_time: None,
        }
    }

    /// Start `activity` at `now` with its default duration.
    pub const fn starting(activity: MinionActivity, now: u64) -> Self {
        let finish_time = match duration(activity) {
            Some(d) => Some(now.saturating_add(d)),
            None => None,
        };
        Self {
            activity,
            finish_time,
        }
    }

    /// Whether the activity ran out before `now`.
    pub const fn is_expired(&self, now: u64) -> bool {
        match self.finish_time {
            Some(t) => t < now,
            None => false,
        }
    }
}

impl Default for CurrentActivity {
    fn default() -> Self {
        Self::idle()
    }
}

/// Default duration of an activity in ticks.
pub const fn duration(activity: MinionActivity) -> Option<u64> {
    match activity {
        MinionActivity::Idle
        | MinionActivity::BeExecuted
        | MinionActivity::BeTortured => None,
        MinionActivity::Sleep => Some(400),
        MinionActivity::Eat | MinionActivity::BeWhipped => Some(100),
        MinionActivity::Explore | MinionActivity::ExploreNocturnal => Some(250),
        _ => Some(500),
    }
}

/// How concrete tasks for an activity come into being.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSource {
    /// Always available, generated on demand.
    Always,
    /// Generated when the colony owns built furniture serving it.
    Furniture,
    /// Only backed by tasks already in the queue.
    Queue,
}

/// Task source of `activity`.
pub const fn task_source(activity: MinionActivity) -> TaskSource {
    match activity {
        MinionActivity::Idle
        | MinionActivity::Eat
        | MinionActivity::Explore
        | MinionActivity::ExploreNocturnal => TaskSource::Always,
        MinionActivity::Sleep
        | MinionActivity::Train
        | MinionActivity::Study
        | MinionActivity::Archery
        | MinionActivity::Craft
        | MinionActivity::BeWhipped
        | MinionActivity::BeTortured
        | MinionActivity::BeExecuted
        | MinionActivity::Poetry
        | MinionActivity::Ritual => TaskSource::Furniture,
        MinionActivity::Construction
        | MinionActivity::Digging
        | MinionActivity::Hauling
        | MinionActivity::Guarding
        | MinionActivity::Working
        | MinionActivity::Crops => TaskSource::Queue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_sets_finish_time() {
        let a = CurrentActivity::starting(MinionActivity::Sleep, 10);
        assert_eq!(a.finish_time, Some(410));
        assert!(!a.is_expired(410));
        assert!(a.is_expired(411));
        assert!(!CurrentActivity::idle().is_expired(u64::MAX));
    }

    #[test]
    fn queue_activities_never_generate() {
        assert_eq!(task_source(MinionActivity::Guarding), TaskSource::Queue);
        assert_eq!(task_source(MinionActivity::Idle), TaskSource::Always);
        assert_eq!(task_source(MinionActivity::Sleep), TaskSource::Furniture);
    }
}
