//! Serializable policy definitions as delivered by the policy-distribution
//! path.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, PolicyCondition, PolicyId, SchedulerError, WorkloadAction};

/// One policy as written in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDefinition {
    /// Stable policy id.
    pub id: PolicyId,
    /// Display name.
    pub name: String,
    /// Version; higher wins for the same id.
    pub version: u64,
    /// Conflict priority; higher wins.
    #[serde(default)]
    pub priority: i32,
    /// Disabled policies never match.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Conditions that must all hold. Empty matches every query.
    #[serde(default)]
    pub conditions: Vec<PolicyCondition>,
    /// Workload groups the policy is limited to. Empty means all groups.
    #[serde(default)]
    pub workload_groups: Vec<u64>,
    /// Actions in execution order; the first decides the conflict bucket.
    pub actions: Vec<WorkloadAction>,
}

const fn default_enabled() -> bool {
    true
}

impl PolicyDefinition {
    /// Validate a single definition.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidPolicy` describing the first problem.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        let invalid = |reason: &str| SchedulerError::InvalidPolicy {
            id: self.id,
            reason: reason.into(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.actions.is_empty() {
            return Err(invalid("a policy needs at least one action"));
        }
        for action in &self.actions {
            if let WorkloadAction::MoveQueryToGroup { group } = action {
                if group.trim().is_empty() {
                    return Err(invalid("move_query_to_group needs a target group"));
                }
            }
        }
        Ok(())
    }
}

/// A complete set of policy definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    /// All intended policies.
    #[serde(default)]
    pub policies: Vec<PolicyDefinition>,
}

impl PolicySet {
    /// Validate every definition and reject duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidPolicy` for the first offending policy.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        let mut seen = HashSet::with_capacity(self.policies.len());
        for def in &self.policies {
            def.validate()?;
            if !seen.insert(def.id) {
                return Err(SchedulerError::InvalidPolicy {
                    id: def.id,
                    reason: "duplicate policy id".into(),
                });
            }
        }
        Ok(())
    }

    /// Parse a policy set from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Config` on parse failure and
    /// `SchedulerError::InvalidPolicy` on validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let set: Self = serde_json::from_str(input)
            .map_err(|e| SchedulerError::Config(format!("parse error: {e}")))?;
        set.validate()?;
        Ok(set)
    }
}

/// Read and validate a JSON policy set from disk.
///
/// # Errors
///
/// Fails if the file cannot be read, parsed or validated.
pub fn load_policy_set(path: impl AsRef<Path>) -> AppResult<PolicySet> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading policy file {}", path.display()))?;
    let set = PolicySet::from_json_str(&raw)
        .with_context(|| format!("loading policies from {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        policies = set.policies.len(),
        "loaded workload policies"
    );
    Ok(set)
}
