//! Scheduler counters and their snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative scheduler statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Scheduling passes performed.
    pub ticks: u64,
    /// Live queries that went through policy evaluation.
    pub queries_evaluated: u64,
    /// Listed queries that had already finished.
    pub dead_references_skipped: u64,
    /// Actions handed to the resource contexts.
    pub actions_dispatched: u64,
    /// Actions that returned an error or panicked.
    pub action_failures: u64,
    /// Queries where a move and a cancel competed.
    pub conflicts_resolved: u64,
    /// Queries whose evaluation panicked.
    pub evaluation_failures: u64,
}

/// Lock-free counters backing [`SchedulerStats`].
#[derive(Debug, Default)]
pub(crate) struct SchedulerCounters {
    pub ticks: AtomicU64,
    pub queries_evaluated: AtomicU64,
    pub dead_references_skipped: AtomicU64,
    pub actions_dispatched: AtomicU64,
    pub action_failures: AtomicU64,
    pub conflicts_resolved: AtomicU64,
    pub evaluation_failures: AtomicU64,
}

impl SchedulerCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            queries_evaluated: self.queries_evaluated.load(Ordering::Relaxed),
            dead_references_skipped: self.dead_references_skipped.load(Ordering::Relaxed),
            actions_dispatched: self.actions_dispatched.load(Ordering::Relaxed),
            action_failures: self.action_failures.load(Ordering::Relaxed),
            conflicts_resolved: self.conflicts_resolved.load(Ordering::Relaxed),
            evaluation_failures: self.evaluation_failures.load(Ordering::Relaxed),
        }
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = SchedulerStats::default();
        assert_eq!(stats.ticks, 0);
        assert_eq!(stats.actions_dispatched, 0);
    }

    #[test]
    fn test_counters_snapshot() {
        let counters = SchedulerCounters::default();
        SchedulerCounters::add(&counters.ticks, 3);
        SchedulerCounters::add(&counters.queries_evaluated, 10);
        SchedulerCounters::add(&counters.dead_references_skipped, 2);

        let stats = counters.snapshot();
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.queries_evaluated, 10);
        assert_eq!(stats.dead_references_skipped, 2);
        assert_eq!(stats.action_failures, 0);
    }
}
