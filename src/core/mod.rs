//! Policy model, conflict resolution and the scheduling loop.

pub mod action;
pub mod audit;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod policy_table;
pub mod scheduler;
pub mod stats;

pub use action::{ActionType, RuntimeActionContext, WorkloadAction};
pub use audit::{build_audit_event, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink};
pub use context::{QueryRegistry, QueryStats, ResourceContext};
pub use error::{AppResult, SchedulerError};
pub use evaluator::{resolve, ResolvedPolicies};
pub use policy::{ActionOutcome, CompareOp, PolicyCondition, PolicyId, PolicyMetric, SchedulingPolicy};
pub use policy_table::{PolicySnapshot, PolicyTable, SyncSummary};
pub use scheduler::{PassSummary, SchedulerState, WorkloadScheduler, SCHEDULE_INTERVAL};
pub use stats::SchedulerStats;
