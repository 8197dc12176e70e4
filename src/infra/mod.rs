//! Infrastructure adapters for the query registry collaborator.

pub mod registry;
pub use registry::{InMemoryQueryRegistry, TrackedQuery};
