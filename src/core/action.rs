//! Governance actions and the per-query context they execute against.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::context::{QueryStats, ResourceContext};
use crate::core::error::SchedulerError;

/// Kind of governance action.
///
/// The declaration order is the execution order when several action types
/// survive conflict resolution for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Move the query to a different workload group.
    MoveQueryToGroup,
    /// Cancel the query.
    CancelQuery,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveQueryToGroup => write!(f, "move_query_to_group"),
            Self::CancelQuery => write!(f, "cancel_query"),
        }
    }
}

/// A governance action attached to a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkloadAction {
    /// Move the query into `group`.
    MoveQueryToGroup {
        /// Target workload group name.
        group: String,
    },
    /// Cancel the query.
    CancelQuery,
}

impl WorkloadAction {
    /// Action type used for conflict bucketing.
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::MoveQueryToGroup { .. } => ActionType::MoveQueryToGroup,
            Self::CancelQuery => ActionType::CancelQuery,
        }
    }

    /// Apply this action to the query bound in `ctx`.
    ///
    /// `policy_name` and `policy_id` identify the policy on whose behalf the
    /// action runs; they end up in the cancellation message.
    ///
    /// # Errors
    ///
    /// Propagates whatever the resource context reports.
    pub fn execute(
        &self,
        ctx: &RuntimeActionContext<'_>,
        policy_name: &str,
        policy_id: u64,
    ) -> Result<(), SchedulerError> {
        match self {
            Self::CancelQuery => {
                let reason = format!(
                    "query {} cancelled by workload policy: {policy_name}, id: {policy_id}",
                    ctx.query_id()
                );
                tracing::info!(query_id = ctx.query_id(), policy_id, "{reason}");
                ctx.resource().cancel(&reason)
            }
            Self::MoveQueryToGroup { group } => {
                tracing::info!(
                    query_id = ctx.query_id(),
                    policy_id,
                    group = group.as_str(),
                    "moving query to workload group"
                );
                ctx.resource().move_to_group(group)
            }
        }
    }
}

/// A resolved, still-live query bound for one evaluation within one tick.
///
/// Borrows the upgraded resource context, so it cannot outlive the tick
/// iteration that created it. Stats are sampled once on construction so that
/// every policy sees the same numbers.
pub struct RuntimeActionContext<'a> {
    resource: &'a dyn ResourceContext,
    stats: QueryStats,
}

impl<'a> RuntimeActionContext<'a> {
    /// Bind a live resource context.
    pub fn new(resource: &'a dyn ResourceContext) -> Self {
        let stats = resource.stats();
        Self { resource, stats }
    }

    /// The bound resource context.
    #[must_use]
    pub fn resource(&self) -> &'a dyn ResourceContext {
        self.resource
    }

    /// Query identifier.
    #[must_use]
    pub fn query_id(&self) -> &'a str {
        self.resource.query_id()
    }

    /// Stats sampled when the context was bound.
    #[must_use]
    pub const fn stats(&self) -> &QueryStats {
        &self.stats
    }
}

impl fmt::Debug for RuntimeActionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeActionContext")
            .field("query_id", &self.query_id())
            .field("stats", &self.stats)
            .finish()
    }
}
