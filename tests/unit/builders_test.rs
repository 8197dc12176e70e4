//! Tests for builder modules

use std::sync::Arc;

use workload_sched::builders::{build_policy_snapshot, build_scheduler};
use workload_sched::config::{PolicyDefinition, PolicySet, SchedulerConfig};
use workload_sched::core::{SchedulerError, SchedulerState, WorkloadAction};
use workload_sched::infra::{InMemoryQueryRegistry, TrackedQuery};

fn cancel_all(id: u64, version: u64) -> PolicyDefinition {
    PolicyDefinition {
        id,
        name: format!("cancel-{id}"),
        version,
        priority: 1,
        enabled: true,
        conditions: Vec::new(),
        workload_groups: Vec::new(),
        actions: vec![WorkloadAction::CancelQuery],
    }
}

#[test]
fn test_snapshot_keyed_by_id() {
    let set = PolicySet {
        policies: vec![cancel_all(3, 1), cancel_all(1, 4)],
    };
    let snapshot = build_policy_snapshot(&set).unwrap();
    assert_eq!(snapshot.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(snapshot[&1].version(), 4);
}

#[test]
fn test_build_scheduler_loads_policies() {
    let registry = Arc::new(InMemoryQueryRegistry::new());
    let set = PolicySet {
        policies: vec![cancel_all(1, 1), cancel_all(2, 1)],
    };

    let parts = build_scheduler(SchedulerConfig::default(), registry.clone(), &set).unwrap();
    assert_eq!(parts.initial_sync.inserted, 2);
    assert_eq!(parts.scheduler.policies().len(), 2);
    assert_eq!(parts.scheduler.state(), SchedulerState::Stopped);

    let query = registry.register(TrackedQuery::new("q1"));
    parts.scheduler.schedule_once();
    assert!(query.is_cancelled());
    // Both policies share the cancel bucket; only one dispatches.
    assert_eq!(parts.audit.len(), 1);
    assert_eq!(parts.audit.events()[0].policy_id, 1);
}

#[test]
fn test_build_scheduler_rejects_bad_config() {
    let registry = Arc::new(InMemoryQueryRegistry::new());
    let config = SchedulerConfig {
        thread_name: String::new(),
        ..SchedulerConfig::default()
    };
    let result = build_scheduler(config, registry, &PolicySet::default());
    assert!(matches!(result, Err(SchedulerError::Config(_))));
}
