//! Step callback that logs colony summaries.
//!
//! Every `interval` ticks each colony's [`TickSummary`] is written as one
//! structured `info!` line. Totals over the whole run are kept for the
//! end-of-run report.

use colony_core::simulation::StepCallback;
use colony_core::{StepReport, TickSummary};
use tracing::{debug, info};

/// Logs summaries at a fixed tick interval and counts what the run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryLogger {
    interval: u64,
    steps: u64,
    events: u64,
    notices: u64,
    funded: u64,
    escaped: u64,
}

impl SummaryLogger {
    /// Log every `interval` ticks; 0 disables the periodic lines.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            steps: 0,
            events: 0,
            notices: 0,
            funded: 0,
            escaped: 0,
        }
    }

    /// Steps observed.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Events delivered over the run.
    pub const fn events(&self) -> u64 {
        self.events
    }

    /// Notices handed to controllers over the run.
    pub const fn notices(&self) -> u64 {
        self.notices
    }

    /// Construction and trap tasks funded over the run.
    pub const fn funded(&self) -> u64 {
        self.funded
    }

    /// Prisoners that escaped over the run.
    pub const fn escaped(&self) -> u64 {
        self.escaped
    }

    /// Whether `tick` gets a summary line.
    pub fn is_due(&self, tick: u64) -> bool {
        tick.checked_rem(self.interval) == Some(0)
    }
}

fn widen(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn log_summary(summary: &TickSummary) {
    let stats = &summary.stats;
    info!(
        tick = summary.tick,
        colony = %summary.colony,
        members = stats.members,
        population = stats.population,
        max_population = stats.max_population,
        fighters = stats.fighters,
        workers = stats.workers,
        prisoners = stats.prisoners,
        tasks = summary.tasks,
        danger = summary.danger,
        warnings = ?summary.warnings,
        "colony summary"
    );
}

impl StepCallback for SummaryLogger {
    fn on_step(&mut self, report: &StepReport) {
        self.steps = self.steps.saturating_add(1);
        self.events = self.events.saturating_add(widen(report.events));
        self.notices = self.notices.saturating_add(widen(report.notices));
        for summary in &report.summaries {
            self.funded = self.funded.saturating_add(widen(summary.funded));
            self.escaped = self.escaped.saturating_add(widen(summary.escaped));
        }
        if self.is_due(report.tick) {
            for summary in &report.summaries {
                log_summary(summary);
            }
        } else {
            debug!(tick = report.tick, events = report.events, "step");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(tick: u64, events: usize) -> StepReport {
        StepReport {
            tick,
            summaries: Vec::new(),
            events,
            notices: 1,
        }
    }

    #[test]
    fn interval_zero_disables_lines() {
        let logger = SummaryLogger::new(0);
        assert!(!logger.is_due(0));
        assert!(!logger.is_due(100));
        let logger = SummaryLogger::new(50);
        assert!(logger.is_due(100));
        assert!(!logger.is_due(101));
    }

    #[test]
    fn totals_accumulate() {
        let mut logger = SummaryLogger::new(10);
        logger.on_step(&report(1, 2));
        logger.on_step(&report(2, 3));
        assert_eq!(logger.steps(), 2);
        assert_eq!(logger.events(), 5);
        assert_eq!(logger.notices(), 2);
        assert_eq!(logger.funded(), 0);
    }
}
