//! Assemble a scheduler, its audit log and the initial policy set.

use std::sync::Arc;

use crate::config::{PolicySet, SchedulerConfig};
use crate::core::{
    InMemoryAuditSink, QueryRegistry, SchedulerError, SyncSummary, WorkloadScheduler,
};

use super::policy_builder::build_policy_snapshot;

/// A ready-to-start scheduler and the handles built alongside it.
pub struct SchedulerParts {
    /// The scheduler, stopped.
    pub scheduler: WorkloadScheduler,
    /// Reader handle on the scheduler's audit log.
    pub audit: InMemoryAuditSink,
    /// Result of loading `policies` into the table.
    pub initial_sync: SyncSummary,
}

/// Validate `config`, build a scheduler with an in-memory audit log of
/// `config.audit_capacity` events, and load `policies`.
///
/// # Errors
///
/// Returns `SchedulerError::Config` for an invalid config and
/// `SchedulerError::InvalidPolicy` for an invalid policy set.
pub fn build_scheduler(
    config: SchedulerConfig,
    registry: Arc<dyn QueryRegistry>,
    policies: &PolicySet,
) -> Result<SchedulerParts, SchedulerError> {
    config.validate().map_err(SchedulerError::Config)?;
    let snapshot = build_policy_snapshot(policies)?;

    let audit = InMemoryAuditSink::new(config.audit_capacity);
    let scheduler = WorkloadScheduler::new(config, registry).with_audit(Box::new(audit.clone()));
    let initial_sync = scheduler.update_policies(&snapshot);

    Ok(SchedulerParts {
        scheduler,
        audit,
        initial_sync,
    })
}
