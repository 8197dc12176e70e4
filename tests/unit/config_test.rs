//! Tests for configuration validation

use std::io::Write;

use workload_sched::config::{load_policy_set, PolicyDefinition, PolicySet, SchedulerConfig};
use workload_sched::core::{CompareOp, PolicyMetric, SchedulerError, WorkloadAction};

const POLICY_JSON: &str = r#"{
    "policies": [
        {
            "id": 1,
            "name": "cancel long queries",
            "version": 2,
            "priority": 10,
            "conditions": [
                { "metric": "query_time", "op": "greater", "value": 60000 }
            ],
            "actions": [{ "type": "cancel_query" }]
        },
        {
            "id": 2,
            "name": "demote big scans",
            "version": 1,
            "enabled": false,
            "workload_groups": [3, 4],
            "conditions": [
                { "metric": "scan_bytes", "op": "greater_equal", "value": 1073741824 }
            ],
            "actions": [{ "type": "move_query_to_group", "group": "batch" }]
        }
    ]
}"#;

#[test]
fn test_scheduler_config_validation() {
    let valid = SchedulerConfig::default();
    assert!(valid.validate().is_ok());
}

#[test]
fn test_scheduler_config_empty_thread_name() {
    let invalid = SchedulerConfig {
        thread_name: "  ".to_string(),
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_from_json() {
    let config = SchedulerConfig::from_json_str(
        r#"{ "thread_name": "wg-sched", "thread_stack_size": 262144 }"#,
    )
    .unwrap();
    assert_eq!(config.thread_name, "wg-sched");
    assert_eq!(config.thread_stack_size, Some(262_144));
    assert_eq!(config.audit_capacity, 1024);
}

#[test]
fn test_scheduler_config_from_bad_json() {
    let err = SchedulerConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, SchedulerError::Config(_)));
}

#[test]
fn test_scheduler_config_from_env() {
    std::env::set_var("WORKLOAD_SCHED_THREAD_NAME", "env-sched");
    std::env::set_var("WORKLOAD_SCHED_AUDIT_CAPACITY", "16");
    let config = SchedulerConfig::from_env().unwrap();
    std::env::remove_var("WORKLOAD_SCHED_THREAD_NAME");
    std::env::remove_var("WORKLOAD_SCHED_AUDIT_CAPACITY");

    assert_eq!(config.thread_name, "env-sched");
    assert_eq!(config.audit_capacity, 16);
    assert_eq!(config.thread_stack_size, None);
}

#[test]
fn test_policy_set_from_json() {
    let set = PolicySet::from_json_str(POLICY_JSON).unwrap();
    assert_eq!(set.policies.len(), 2);

    let first = &set.policies[0];
    assert!(first.enabled);
    assert_eq!(first.priority, 10);
    assert_eq!(first.conditions[0].metric, PolicyMetric::QueryTime);
    assert_eq!(first.conditions[0].op, CompareOp::Greater);
    assert_eq!(first.actions, vec![WorkloadAction::CancelQuery]);

    let second = &set.policies[1];
    assert!(!second.enabled);
    assert_eq!(second.priority, 0);
    assert_eq!(second.workload_groups, vec![3, 4]);
    assert_eq!(
        second.actions,
        vec![WorkloadAction::MoveQueryToGroup {
            group: "batch".to_string()
        }]
    );
}

#[test]
fn test_policy_set_rejects_duplicates() {
    let def = PolicyDefinition {
        id: 5,
        name: "dup".to_string(),
        version: 1,
        priority: 0,
        enabled: true,
        conditions: Vec::new(),
        workload_groups: Vec::new(),
        actions: vec![WorkloadAction::CancelQuery],
    };
    let set = PolicySet {
        policies: vec![def.clone(), def],
    };
    let err = set.validate().unwrap_err();
    assert_eq!(err.to_string(), "invalid policy 5: duplicate policy id");
}

#[test]
fn test_policy_set_rejects_unknown_action() {
    let json = r#"{ "policies": [{
        "id": 1, "name": "x", "version": 1,
        "actions": [{ "type": "set_session_variable" }]
    }] }"#;
    assert!(matches!(
        PolicySet::from_json_str(json),
        Err(SchedulerError::Config(_))
    ));
}

#[test]
fn test_load_policy_set_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(POLICY_JSON.as_bytes()).unwrap();

    let set = load_policy_set(file.path()).unwrap();
    assert_eq!(set.policies.len(), 2);
}

#[test]
fn test_load_policy_set_missing_file() {
    let err = load_policy_set("/definitely/not/here/policies.json").unwrap_err();
    assert!(err.to_string().contains("reading policy file"));
}
