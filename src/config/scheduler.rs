//! Scheduler runtime settings.
//!
//! The tick interval is a fixed constant and intentionally not configurable.

use std::env;

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;

/// Minimum worker stack size accepted.
const MIN_STACK_SIZE: usize = 64 * 1024;

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Name given to the worker thread.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
    /// Worker stack size in bytes; platform default when unset.
    #[serde(default)]
    pub thread_stack_size: Option<usize>,
    /// Events kept by the in-memory audit log built alongside the scheduler.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

fn default_thread_name() -> String {
    "workload_scheduler".into()
}

const fn default_audit_capacity() -> usize {
    1024
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
            thread_stack_size: None,
            audit_capacity: default_audit_capacity(),
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.thread_name.trim().is_empty() {
            return Err("thread_name must not be empty".into());
        }
        if self.thread_name.contains('\0') {
            return Err("thread_name must not contain NUL bytes".into());
        }
        if let Some(size) = self.thread_stack_size {
            if size < MIN_STACK_SIZE {
                return Err(format!("thread_stack_size must be at least {MIN_STACK_SIZE}"));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Config` on parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| SchedulerError::Config(format!("parse error: {e}")))?;
        cfg.validate().map_err(SchedulerError::Config)?;
        Ok(cfg)
    }

    /// Load `.env` (if present) and read overrides from the environment:
    /// `WORKLOAD_SCHED_THREAD_NAME`, `WORKLOAD_SCHED_STACK_SIZE`,
    /// `WORKLOAD_SCHED_AUDIT_CAPACITY`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Config` if a numeric variable does not parse
    /// or the result fails validation.
    pub fn from_env() -> Result<Self, SchedulerError> {
        dotenvy::dotenv().ok();

        let mut cfg = Self::default();
        if let Some(name) = env_opt("WORKLOAD_SCHED_THREAD_NAME") {
            cfg.thread_name = name;
        }
        if let Some(size) = env_opt("WORKLOAD_SCHED_STACK_SIZE") {
            cfg.thread_stack_size = Some(parse_usize("WORKLOAD_SCHED_STACK_SIZE", &size)?);
        }
        if let Some(cap) = env_opt("WORKLOAD_SCHED_AUDIT_CAPACITY") {
            cfg.audit_capacity = parse_usize("WORKLOAD_SCHED_AUDIT_CAPACITY", &cap)?;
        }
        cfg.validate().map_err(SchedulerError::Config)?;
        Ok(cfg)
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, SchedulerError> {
    value
        .trim()
        .parse()
        .map_err(|e| SchedulerError::Config(format!("{key}={value}: {e}")))
}
