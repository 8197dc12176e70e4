//! Scheduling policies: a predicate over query runtime state plus the actions
//! to apply when it holds.

use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::core::action::{ActionType, RuntimeActionContext, WorkloadAction};
use crate::core::context::QueryStats;
use crate::core::error::SchedulerError;

/// Policy identifier, stable across versions.
pub type PolicyId = u64;

/// Query metric a condition compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMetric {
    /// Milliseconds since the query started.
    QueryTime,
    /// Rows scanned.
    ScanRows,
    /// Bytes scanned.
    ScanBytes,
    /// Memory held by the query.
    QueryMemoryBytes,
}

impl PolicyMetric {
    const fn read(self, stats: &QueryStats) -> i64 {
        match self {
            Self::QueryTime => stats.query_time_ms,
            Self::ScanRows => stats.scan_rows,
            Self::ScanBytes => stats.scan_bytes,
            Self::QueryMemoryBytes => stats.memory_bytes,
        }
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// `metric == value`
    Equal,
    /// `metric > value`
    Greater,
    /// `metric >= value`
    GreaterEqual,
    /// `metric < value`
    Less,
    /// `metric <= value`
    LessEqual,
}

/// One `metric op value` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCondition {
    /// Metric read from the query stats.
    pub metric: PolicyMetric,
    /// Comparison operator.
    pub op: CompareOp,
    /// Threshold to compare against.
    pub value: i64,
}

impl PolicyCondition {
    /// Build a condition.
    #[must_use]
    pub const fn new(metric: PolicyMetric, op: CompareOp, value: i64) -> Self {
        Self { metric, op, value }
    }

    /// Evaluate against a stats snapshot.
    #[must_use]
    pub const fn eval(&self, stats: &QueryStats) -> bool {
        let actual = self.metric.read(stats);
        match self.op {
            CompareOp::Equal => actual == self.value,
            CompareOp::Greater => actual > self.value,
            CompareOp::GreaterEqual => actual >= self.value,
            CompareOp::Less => actual < self.value,
            CompareOp::LessEqual => actual <= self.value,
        }
    }
}

/// Result of running one action of a policy.
#[derive(Debug)]
pub struct ActionOutcome {
    /// Which action ran.
    pub action_type: ActionType,
    /// What the collaborator reported.
    pub result: Result<(), SchedulerError>,
}

/// A versioned scheduling policy.
///
/// Immutable once built; a newer version replaces the whole object in the
/// policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingPolicy {
    id: PolicyId,
    name: String,
    version: u64,
    priority: i32,
    enabled: bool,
    conditions: Vec<PolicyCondition>,
    workload_groups: BTreeSet<u64>,
    actions: Vec<WorkloadAction>,
}

impl SchedulingPolicy {
    /// Create an enabled policy with no conditions, which matches every query.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidPolicy` if `actions` is empty.
    pub fn new(
        id: PolicyId,
        version: u64,
        priority: i32,
        actions: Vec<WorkloadAction>,
    ) -> Result<Self, SchedulerError> {
        if actions.is_empty() {
            return Err(SchedulerError::InvalidPolicy {
                id,
                reason: "a policy needs at least one action".into(),
            });
        }
        Ok(Self {
            id,
            name: format!("policy-{id}"),
            version,
            priority,
            enabled: true,
            conditions: Vec::new(),
            workload_groups: BTreeSet::new(),
            actions,
        })
    }

    /// Set a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Require every one of `conditions` to hold.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Vec<PolicyCondition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Restrict the policy to queries running in one of `groups`.
    #[must_use]
    pub fn with_workload_groups(mut self, groups: impl IntoIterator<Item = u64>) -> Self {
        self.workload_groups = groups.into_iter().collect();
        self
    }

    /// Enable or disable the policy.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Policy id.
    #[must_use]
    pub const fn id(&self) -> PolicyId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version; higher wins for the same id.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Priority; higher wins conflicts.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether the policy can match at all.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Conditions that must all hold.
    #[must_use]
    pub fn conditions(&self) -> &[PolicyCondition] {
        &self.conditions
    }

    /// Actions in execution order.
    #[must_use]
    pub fn actions(&self) -> &[WorkloadAction] {
        &self.actions
    }

    /// Conflict bucket of this policy: the type of its first action.
    #[must_use]
    pub fn primary_action_type(&self) -> ActionType {
        // `new` rejects empty action lists.
        self.actions
            .first()
            .map_or(ActionType::CancelQuery, WorkloadAction::action_type)
    }

    /// Whether this policy applies to the query bound in `ctx`.
    #[must_use]
    pub fn is_match(&self, ctx: &RuntimeActionContext<'_>) -> bool {
        if !self.enabled {
            return false;
        }
        if !self.workload_groups.is_empty() {
            match ctx.resource().workload_group_id() {
                Some(group) if self.workload_groups.contains(&group) => {}
                _ => return false,
            }
        }
        self.conditions.iter().all(|c| c.eval(ctx.stats()))
    }

    /// Run every action of this policy against `ctx`, in declared order.
    ///
    /// A failing or panicking action does not prevent the following ones
    /// from running.
    pub fn exec_action(&self, ctx: &RuntimeActionContext<'_>) -> Vec<ActionOutcome> {
        self.actions
            .iter()
            .map(|action| {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    action.execute(ctx, &self.name, self.id)
                }))
                .unwrap_or_else(|_| {
                    Err(SchedulerError::ActionFailed {
                        query_id: ctx.query_id().to_string(),
                        reason: format!("{} panicked", action.action_type()),
                    })
                });
                ActionOutcome {
                    action_type: action.action_type(),
                    result,
                }
            })
            .collect()
    }
}
