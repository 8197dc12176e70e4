//! Builders turning configuration into scheduler components.

pub mod policy_builder;
pub mod scheduler_builder;

pub use policy_builder::{build_policy, build_policy_snapshot};
pub use scheduler_builder::{build_scheduler, SchedulerParts};
