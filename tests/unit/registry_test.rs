//! Tests for the in-memory query registry

use std::sync::Arc;
use std::time::{Duration, Instant};

use workload_sched::core::{QueryRegistry, ResourceContext};
use workload_sched::infra::{InMemoryQueryRegistry, TrackedQuery};

#[test]
fn test_register_and_complete() {
    let registry = InMemoryQueryRegistry::new();
    assert!(registry.is_empty());

    registry.register(TrackedQuery::new("q1"));
    registry.register(TrackedQuery::new("q2").in_group(7));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("q2").unwrap().workload_group_id(), Some(7));

    assert!(registry.complete("q1").is_some());
    assert!(registry.complete("q1").is_none());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_register_replaces_same_id() {
    let registry = InMemoryQueryRegistry::new();
    registry.register(TrackedQuery::new("q1"));
    registry.register(TrackedQuery::new("q1").in_group(2));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("q1").unwrap().workload_group_id(), Some(2));
}

#[test]
fn test_handles_are_non_owning() {
    let registry = InMemoryQueryRegistry::new();
    let held = registry.register(TrackedQuery::new("q1"));
    registry.register(TrackedQuery::new("q2"));

    let handles = registry.live_query_contexts();
    registry.complete("q1");
    registry.complete("q2");

    // q1 is still owned by the test, q2 is gone.
    let alive: Vec<String> = handles
        .iter()
        .filter_map(|h| h.upgrade())
        .map(|ctx| ctx.query_id().to_string())
        .collect();
    assert_eq!(alive, vec!["q1".to_string()]);
    assert_eq!(Arc::strong_count(&held), 1);
}

#[test]
fn test_query_time_tracks_start() {
    let started = Instant::now()
        .checked_sub(Duration::from_secs(5))
        .unwrap_or_else(Instant::now);
    let query = TrackedQuery::started_at("q1", started);
    assert!(query.stats().query_time_ms >= 4_000);
}

#[test]
fn test_move_records_target() {
    let query = TrackedQuery::new("q1");
    query.move_to_group("batch").unwrap();
    query.move_to_group("archive").unwrap();
    assert_eq!(query.target_group().as_deref(), Some("archive"));
    assert_eq!(query.move_calls(), 2);
    assert!(!query.is_cancelled());
}
