//! Activity eligibility.
//!
//! # Design
//!
//! Eligibility is two gates evaluated in order:
//!
//! 1. [`is_eligible_assuming_tasks`]: capability, locks and a fixed
//!    situational rule per activity.
//! 2. [`is_eligible`]: the first gate plus the existence of a concrete
//!    task, either generatable now or already queued and unclaimed.
//!
//! Both are pure. The caller gathers the inputs from the roster, the
//! agent service and the task queue.

use colony_types::{MinionActivity, SunlightState};

/// Morale below which a minion accepts being whipped.
pub const WHIPPING_MORALE_LIMIT: f64 = 0.95;

/// Colony-wide facts the situational rules read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Situation {
    /// Light cycle.
    pub sunlight: SunlightState,
    /// The colony's villain has its own sleeping schedule.
    pub villain_sleeping: bool,
    /// Current population size.
    pub population: u32,
    /// Population limit.
    pub max_population: u32,
}

/// Per-agent facts for one activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// The agent's attributes allow the activity.
    pub capable: bool,
    /// Locked for this agent.
    pub locked: bool,
    /// Locked for the agent's group.
    pub group_locked: bool,
    /// Current morale.
    pub morale: f64,
}

/// The situational rule for `activity`.
pub fn situational_gate(activity: MinionActivity, morale: f64, situation: &Situation) -> bool {
    let night = situation.sunlight == SunlightState::Night;
    match activity {
        MinionActivity::BeWhipped => morale < WHIPPING_MORALE_LIMIT,
        MinionActivity::Crops | MinionActivity::Explore => !night,
        MinionActivity::Sleep => !situation.villain_sleeping || night,
        MinionActivity::ExploreNocturnal => night,
        MinionActivity::BeTortured => situation.max_population > situation.population,
        _ => true,
    }
}

/// First gate: capability, locks (unless `ignore_locks`) and the situational
/// rule.
pub fn is_eligible_assuming_tasks(
    activity: MinionActivity,
    candidate: &Candidate,
    situation: &Situation,
    ignore_locks: bool,
) -> bool {
    if !candidate.capable {
        return false;
    }
    if !ignore_locks && (candidate.locked || candidate.group_locked) {
        return false;
    }
    situational_gate(activity, candidate.morale, situation)
}

/// Full eligibility: the first gate plus a concrete task behind it.
pub fn is_eligible(
    activity: MinionActivity,
    candidate: &Candidate,
    situation: &Situation,
    ignore_locks: bool,
    generatable: bool,
    has_unclaimed: bool,
) -> bool {
    is_eligible_assuming_tasks(activity, candidate, situation, ignore_locks)
        && (generatable || has_unclaimed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Situation = Situation {
        sunlight: SunlightState::Day,
        villain_sleeping: false,
        population: 3,
        max_population: 5,
    };

    const ABLE: Candidate = Candidate {
        capable: true,
        locked: false,
        group_locked: false,
        morale: 0.0,
    };

    #[test]
    fn whipping_needs_low_morale() {
        assert!(situational_gate(MinionActivity::BeWhipped, 0.5, &DAY));
        assert!(!situational_gate(MinionActivity::BeWhipped, 0.95, &DAY));
    }

    #[test]
    fn day_and_night_activities() {
        let night = Situation {
            sunlight: SunlightState::Night,
            ..DAY
        };
        assert!(situational_gate(MinionActivity::Crops, 0.0, &DAY));
        assert!(!situational_gate(MinionActivity::Crops, 0.0, &night));
        assert!(situational_gate(MinionActivity::ExploreNocturnal, 0.0, &night));
        assert!(!situational_gate(MinionActivity::ExploreNocturnal, 0.0, &DAY));
    }

    #[test]
    fn villain_sleeping_restricts_sleep_to_night() {
        let villain = Situation {
            villain_sleeping: true,
            ..DAY
        };
        assert!(situational_gate(MinionActivity::Sleep, 0.0, &DAY));
        assert!(!situational_gate(MinionActivity::Sleep, 0.0, &villain));
    }

    #[test]
    fn torture_needs_population_headroom() {
        let full = Situation {
            population: 5,
            ..DAY
        };
        assert!(situational_gate(MinionActivity::BeTortured, 0.0, &DAY));
        assert!(!situational_gate(MinionActivity::BeTortured, 0.0, &full));
    }

    #[test]
    fn locks_can_be_ignored() {
        let locked = Candidate {
            group_locked: true,
            ..ABLE
        };
        assert!(!is_eligible_assuming_tasks(MinionActivity::Hauling, &locked, &DAY, false));
        assert!(is_eligible_assuming_tasks(MinionActivity::Hauling, &locked, &DAY, true));
    }

    #[test]
    fn eligibility_requires_a_task() {
        assert!(!is_eligible(MinionActivity::Hauling, &ABLE, &DAY, false, false, false));
        assert!(is_eligible(MinionActivity::Hauling, &ABLE, &DAY, false, false, true));
        assert!(is_eligible(MinionActivity::Idle, &ABLE, &DAY, false, true, false));
    }
}
