//! Compile policy definitions into a snapshot for the policy table.

use std::sync::Arc;

use crate::config::{PolicyDefinition, PolicySet};
use crate::core::{PolicySnapshot, SchedulerError, SchedulingPolicy};

/// Build one policy from its definition.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidPolicy` if the definition is invalid.
pub fn build_policy(def: &PolicyDefinition) -> Result<SchedulingPolicy, SchedulerError> {
    def.validate()?;
    Ok(
        SchedulingPolicy::new(def.id, def.version, def.priority, def.actions.clone())?
            .with_name(def.name.clone())
            .with_enabled(def.enabled)
            .with_conditions(def.conditions.clone())
            .with_workload_groups(def.workload_groups.iter().copied()),
    )
}

/// Validate a policy set and build the full-sync snapshot.
///
/// # Errors
///
/// Returns the first validation error; no partial snapshot is produced.
pub fn build_policy_snapshot(set: &PolicySet) -> Result<PolicySnapshot, SchedulerError> {
    set.validate()?;
    set.policies
        .iter()
        .map(|def| Ok((def.id, Arc::new(build_policy(def)?))))
        .collect()
}
