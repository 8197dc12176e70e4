//! Configuration models for the scheduler and policy definitions.

pub mod policy;
pub mod scheduler;

pub use policy::{load_policy_set, PolicyDefinition, PolicySet};
pub use scheduler::SchedulerConfig;
