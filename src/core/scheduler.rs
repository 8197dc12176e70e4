//! Background loop that applies workload policies to live queries.
//!
//! One dedicated OS thread wakes every [`SCHEDULE_INTERVAL`], lists live
//! queries from the registry, matches them against the policy table and
//! dispatches the resolved actions.
//!
//! # Locking
//!
//! - The policy table has its own `RwLock` (see [`PolicyTable`]).
//! - Lifecycle bookkeeping sits behind a separate `Mutex<Lifecycle>`.
//! - The lifecycle lock is never held while taking the policy lock, and the
//!   worker never touches the lifecycle lock, so a slow pass cannot stall
//!   `stop()` beyond the join itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use workload_sched::config::SchedulerConfig;
//! use workload_sched::core::WorkloadScheduler;
//! use workload_sched::infra::InMemoryQueryRegistry;
//!
//! let registry = Arc::new(InMemoryQueryRegistry::new());
//! let scheduler = WorkloadScheduler::new(SchedulerConfig::default(), registry);
//! scheduler.start()?;
//! scheduler.update_policies(&snapshot);
//! // ...
//! scheduler.stop();
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::config::SchedulerConfig;
use crate::core::action::RuntimeActionContext;
use crate::core::audit::{build_audit_event, AuditOutcome, AuditSink};
use crate::core::context::{QueryRegistry, ResourceContext};
use crate::core::error::SchedulerError;
use crate::core::evaluator;
use crate::core::policy::SchedulingPolicy;
use crate::core::policy_table::{PolicySnapshot, PolicyTable, SyncSummary};
use crate::core::stats::{SchedulerCounters, SchedulerStats};

/// Fixed wait between scheduling passes.
pub const SCHEDULE_INTERVAL: Duration = Duration::from_millis(500);

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerState {
    /// No worker thread.
    Stopped = 0,
    /// Worker thread is being spawned.
    Starting = 1,
    /// Worker thread is ticking.
    Running = 2,
    /// Termination signalled, waiting for the worker to exit.
    Stopping = 3,
}

impl SchedulerState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Running,
            3 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// What one scheduling pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Handles returned by the registry.
    pub listed: usize,
    /// Queries still alive and evaluated.
    pub evaluated: usize,
    /// Queries that finished before they could be evaluated.
    pub skipped: usize,
    /// Actions handed to resource contexts.
    pub actions_dispatched: usize,
    /// Actions that failed.
    pub action_failures: usize,
    /// Queries whose evaluation panicked and were skipped for this pass.
    pub evaluation_failures: usize,
}

/// Worker handle and stop signal. Guarded separately from the policy table.
#[derive(Default)]
struct Lifecycle {
    /// Dropping the sender wakes the worker and ends its loop.
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

/// State shared with the worker thread.
struct Shared {
    policies: PolicyTable,
    registry: Arc<dyn QueryRegistry>,
    counters: SchedulerCounters,
    audit: Mutex<Option<Box<dyn AuditSink>>>,
}

/// The workload scheduling policy manager.
///
/// Construct one per process and share it by reference or `Arc`.
pub struct WorkloadScheduler {
    config: SchedulerConfig,
    shared: Arc<Shared>,
    state: AtomicU8,
    lifecycle: Mutex<Lifecycle>,
}

impl WorkloadScheduler {
    /// Create a stopped scheduler reading live queries from `registry`.
    pub fn new(config: SchedulerConfig, registry: Arc<dyn QueryRegistry>) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                policies: PolicyTable::new(),
                registry,
                counters: SchedulerCounters::default(),
                audit: Mutex::new(None),
            }),
            state: AtomicU8::new(SchedulerState::Stopped as u8),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Attach an audit sink receiving one event per executed action.
    #[must_use]
    pub fn with_audit(self, audit: Box<dyn AuditSink>) -> Self {
        *self.shared.audit.lock() = Some(audit);
        self
    }

    /// Spawn the background worker.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::AlreadyRunning` if the scheduler is not stopped
    /// - `SchedulerError::Config` if the thread settings are invalid
    /// - `SchedulerError::SpawnFailed` if the OS refused the thread; the
    ///   scheduler stays stopped
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut lifecycle = self.lifecycle.lock();
        if self.state() != SchedulerState::Stopped {
            return Err(SchedulerError::AlreadyRunning);
        }
        self.config.validate().map_err(SchedulerError::Config)?;
        self.set_state(SchedulerState::Starting);

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let shared = Arc::clone(&self.shared);
        let mut builder = thread::Builder::new().name(self.config.thread_name.clone());
        if let Some(stack_size) = self.config.thread_stack_size {
            builder = builder.stack_size(stack_size);
        }

        match builder.spawn(move || run_worker(&shared, &stop_rx)) {
            Ok(handle) => {
                lifecycle.stop_tx = Some(stop_tx);
                lifecycle.worker = Some(handle);
                self.set_state(SchedulerState::Running);
                info!(
                    thread = self.config.thread_name.as_str(),
                    interval_ms = SCHEDULE_INTERVAL.as_millis(),
                    "workload scheduler started"
                );
                Ok(())
            }
            Err(e) => {
                self.set_state(SchedulerState::Stopped);
                warn!(error = %e, "create workload scheduler thread failed");
                Err(SchedulerError::SpawnFailed(e.to_string()))
            }
        }
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Returns `true` if this call stopped a running worker and `false` if the
    /// scheduler was already stopped. May block for one in-flight pass.
    pub fn stop(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if self.state() == SchedulerState::Stopped {
            info!("workload scheduler is already stopped");
            return false;
        }
        self.set_state(SchedulerState::Stopping);

        drop(lifecycle.stop_tx.take());
        if let Some(worker) = lifecycle.worker.take() {
            if worker.join().is_err() {
                warn!("workload scheduler thread panicked");
            }
        }

        self.set_state(SchedulerState::Stopped);
        info!("workload scheduler stopped, thread is finished");
        true
    }

    /// Full-sync the policy table with `snapshot`.
    pub fn update_policies(&self, snapshot: &PolicySnapshot) -> SyncSummary {
        self.shared.policies.upsert_and_prune(snapshot)
    }

    /// Run one scheduling pass on the calling thread.
    pub fn schedule_once(&self) -> PassSummary {
        self.shared.schedule_once()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        SchedulerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The policy table.
    #[must_use]
    pub fn policies(&self) -> &PolicyTable {
        &self.shared.policies
    }

    /// Cumulative statistics.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.shared.counters.snapshot()
    }

    /// Scheduler configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn set_state(&self, state: SchedulerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl Drop for WorkloadScheduler {
    fn drop(&mut self) {
        // Signal only; the worker exits at its next wait. Explicit stop()
        // is required to join.
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.stop_tx.take().is_some() {
            debug!("WorkloadScheduler dropped without explicit stop - worker will be detached");
        }
    }
}

/// Worker body: wait for the stop signal or the interval, then run a pass.
fn run_worker(shared: &Shared, stop_rx: &Receiver<()>) {
    debug!("workload scheduler thread started");
    loop {
        match stop_rx.recv_timeout(SCHEDULE_INTERVAL) {
            Err(RecvTimeoutError::Timeout) => {
                // Registry panics end the pass, not the worker.
                if catch_unwind(AssertUnwindSafe(|| shared.schedule_once())).is_err() {
                    warn!("workload scheduling pass panicked, retrying next tick");
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("workload scheduler thread exiting");
}

impl Shared {
    fn schedule_once(&self) -> PassSummary {
        SchedulerCounters::add(&self.counters.ticks, 1);

        let contexts = self.registry.live_query_contexts();
        let mut summary = PassSummary {
            listed: contexts.len(),
            ..PassSummary::default()
        };
        if contexts.is_empty() {
            return summary;
        }

        for handle in &contexts {
            let Some(resource) = handle.upgrade() else {
                trace!("query finished before scheduling, skipped");
                summary.skipped += 1;
                continue;
            };
            summary.evaluated += 1;

            let processed =
                catch_unwind(AssertUnwindSafe(|| self.process_query(&*resource, &mut summary)));
            if processed.is_err() {
                summary.evaluation_failures += 1;
                SchedulerCounters::add(&self.counters.evaluation_failures, 1);
                warn!("workload policy evaluation panicked, query skipped for this pass");
            }
        }

        SchedulerCounters::add(&self.counters.queries_evaluated, summary.evaluated as u64);
        SchedulerCounters::add(&self.counters.dead_references_skipped, summary.skipped as u64);
        summary
    }

    /// Match, resolve and dispatch for one live query.
    fn process_query(&self, resource: &dyn ResourceContext, summary: &mut PassSummary) {
        let ctx = RuntimeActionContext::new(resource);
        let resolved = evaluator::resolve(self.policies.snapshot_match(&ctx));
        if resolved.is_empty() {
            return;
        }
        info!(
            query_id = ctx.query_id(),
            matched = resolved.len(),
            "[workload_schedule] matched policies"
        );
        if resolved.conflict_resolved() {
            SchedulerCounters::add(&self.counters.conflicts_resolved, 1);
        }

        for (_, policy) in resolved.iter() {
            self.dispatch(policy, &ctx, summary);
        }
    }

    fn dispatch(
        &self,
        policy: &SchedulingPolicy,
        ctx: &RuntimeActionContext<'_>,
        summary: &mut PassSummary,
    ) {
        for outcome in policy.exec_action(ctx) {
            summary.actions_dispatched += 1;
            SchedulerCounters::add(&self.counters.actions_dispatched, 1);

            let audit_outcome = match outcome.result {
                Ok(()) => AuditOutcome::Applied,
                Err(e) => {
                    summary.action_failures += 1;
                    SchedulerCounters::add(&self.counters.action_failures, 1);
                    warn!(
                        query_id = ctx.query_id(),
                        policy_id = policy.id(),
                        action = %outcome.action_type,
                        error = %e,
                        "workload action failed"
                    );
                    AuditOutcome::Failed(e.to_string())
                }
            };

            if let Some(sink) = self.audit.lock().as_mut() {
                sink.record(build_audit_event(
                    ctx.query_id(),
                    policy.id(),
                    policy.name(),
                    outcome.action_type,
                    audit_outcome,
                ));
            }
        }
    }
}
