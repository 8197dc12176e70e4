//! Tests for error types

use workload_sched::core::SchedulerError;

#[test]
fn test_already_running_error() {
    let err = SchedulerError::AlreadyRunning;
    assert_eq!(format!("{}", err), "workload scheduler is already running");
}

#[test]
fn test_spawn_failed_error() {
    let err = SchedulerError::SpawnFailed("resource temporarily unavailable".to_string());
    assert_eq!(
        format!("{}", err),
        "failed to spawn workload scheduler thread: resource temporarily unavailable"
    );
}

#[test]
fn test_action_failed_error() {
    let err = SchedulerError::ActionFailed {
        query_id: "q1".to_string(),
        reason: "cancel rejected".to_string(),
    };
    assert_eq!(format!("{}", err), "action failed for query q1: cancel rejected");
}

#[test]
fn test_invalid_policy_error() {
    let err = SchedulerError::InvalidPolicy {
        id: 12,
        reason: "duplicate policy id".to_string(),
    };
    assert_eq!(format!("{}", err), "invalid policy 12: duplicate policy id");
}

#[test]
fn test_query_gone_error() {
    let err = SchedulerError::QueryGone("q9".to_string());
    assert_eq!(format!("{}", err), "query q9 is no longer running");
}
