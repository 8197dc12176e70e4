//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::policy::PolicyId;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `start()` was called while the scheduler was not stopped.
    #[error("workload scheduler is already running")]
    AlreadyRunning,
    /// The background worker thread could not be spawned.
    #[error("failed to spawn workload scheduler thread: {0}")]
    SpawnFailed(String),
    /// A governance action failed against a live query.
    #[error("action failed for query {query_id}: {reason}")]
    ActionFailed {
        /// Query the action was applied to.
        query_id: String,
        /// Collaborator-supplied failure reason.
        reason: String,
    },
    /// The query finished before the action could be applied.
    #[error("query {0} is no longer running")]
    QueryGone(String),
    /// A policy definition failed validation.
    #[error("invalid policy {id}: {reason}")]
    InvalidPolicy {
        /// Offending policy id.
        id: PolicyId,
        /// What was wrong with it.
        reason: String,
    },
    /// Configuration could not be parsed or validated.
    #[error("config error: {0}")]
    Config(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
