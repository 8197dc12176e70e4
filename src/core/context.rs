//! Collaborator seams: the query registry and per-query resource contexts.
//!
//! The registry is the sole owner of query state. The scheduler only ever sees
//! [`Weak`] handles and must upgrade them, which fails once a query has ended.

use std::sync::Weak;

use serde::{Deserialize, Serialize};

use crate::core::error::SchedulerError;

/// Point-in-time resource usage of one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Milliseconds since the query started.
    pub query_time_ms: i64,
    /// Rows scanned so far.
    pub scan_rows: i64,
    /// Bytes scanned so far.
    pub scan_bytes: i64,
    /// Memory currently held by the query.
    pub memory_bytes: i64,
}

/// Runtime state of one live query, owned by the query registry.
///
/// Implementations must be cheap to query; `stats` is called once per tick for
/// every live query.
pub trait ResourceContext: Send + Sync {
    /// Identifier of the query this context belongs to.
    fn query_id(&self) -> &str;

    /// Workload group the query currently runs in, if any.
    fn workload_group_id(&self) -> Option<u64>;

    /// Snapshot of the query's resource usage.
    fn stats(&self) -> QueryStats;

    /// Cancel the query with a human-readable reason.
    ///
    /// # Errors
    ///
    /// Returns an error when the collaborator refuses or fails to cancel.
    fn cancel(&self, reason: &str) -> Result<(), SchedulerError>;

    /// Move the query to another workload group.
    ///
    /// # Errors
    ///
    /// Returns an error when the target group is unknown or the move fails.
    fn move_to_group(&self, group: &str) -> Result<(), SchedulerError>;
}

/// Source of live queries.
pub trait QueryRegistry: Send + Sync {
    /// Point-in-time list of weak handles to every live query.
    ///
    /// Handles may already be dead by the time they are consumed.
    fn live_query_contexts(&self) -> Vec<Weak<dyn ResourceContext>>;
}
