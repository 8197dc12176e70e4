//! Query registry backends.

pub mod memory;

pub use memory::{InMemoryQueryRegistry, TrackedQuery};
