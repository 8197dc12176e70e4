//! # Workload Sched
//!
//! The governance control loop of a query-execution engine.
//!
//! A single background thread wakes every 500 ms, lists every live query from
//! the engine's query registry, evaluates the operator-supplied scheduling
//! policies against each query's resource usage and, when policies match,
//! dispatches a governance action such as moving the query to another
//! workload group or cancelling it.
//!
//! ## Key Features
//!
//! - **Versioned policy table**: full-sync updates that upsert newer versions
//!   and prune absent ids atomically, readable while the loop runs
//! - **Deterministic conflict resolution**: one policy per action type, highest
//!   priority wins, lower policy id wins ties, cancel beats move unless the move
//!   has strictly higher priority
//! - **Weak query handles**: the registry owns query state; queries that finish
//!   mid-tick are skipped, never touched
//! - **Isolated actions**: a failing or panicking action is logged and audited
//!   without aborting the tick
//! - **Explicit lifecycle**: `start()` reports spawn failures, `stop()` is
//!   idempotent and joins the worker
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use workload_sched::builders::build_policy_snapshot;
//! use workload_sched::config::{PolicySet, SchedulerConfig};
//! use workload_sched::core::WorkloadScheduler;
//! use workload_sched::infra::{InMemoryQueryRegistry, TrackedQuery};
//!
//! let registry = Arc::new(InMemoryQueryRegistry::new());
//! let scheduler = WorkloadScheduler::new(SchedulerConfig::from_env()?, registry.clone());
//! scheduler.start()?;
//!
//! let set = PolicySet::from_json_str(r#"{
//!     "policies": [{
//!         "id": 1, "name": "kill long queries", "version": 1, "priority": 10,
//!         "conditions": [{ "metric": "query_time", "op": "greater", "value": 60000 }],
//!         "actions": [{ "type": "cancel_query" }]
//!     }]
//! }"#)?;
//! scheduler.update_policies(&build_policy_snapshot(&set)?);
//!
//! registry.register(TrackedQuery::new("q-42"));
//! // ...
//! scheduler.stop();
//! ```
//!
//! For complete scenarios, see `tests/scheduler_loop_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Policy model, conflict resolution and the scheduling loop.
pub mod core;
/// Configuration models for the scheduler and policy definitions.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Infrastructure adapters for the query registry.
pub mod infra;
/// Shared utilities.
pub mod util;
