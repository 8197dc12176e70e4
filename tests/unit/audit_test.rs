//! Tests for audit sink

use workload_sched::core::{
    build_audit_event, ActionType, AuditOutcome, AuditSink, InMemoryAuditSink,
};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        "q1",
        7,
        "kill long queries",
        ActionType::CancelQuery,
        AuditOutcome::Applied,
    );

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].query_id, "q1");
    assert_eq!(events[0].policy_id, 7);
    assert_eq!(events[0].action, ActionType::CancelQuery);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    for query in ["q1", "q2", "q3"] {
        sink.record(build_audit_event(
            query,
            1,
            "p1",
            ActionType::CancelQuery,
            AuditOutcome::Applied,
        ));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].query_id, "q2"); // First one popped
    assert_eq!(events[1].query_id, "q3");
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event(
        "q1",
        3,
        "move scans",
        ActionType::MoveQueryToGroup,
        AuditOutcome::Failed("move rejected".to_string()),
    );

    assert_eq!(event.query_id, "q1");
    assert_eq!(event.policy_id, 3);
    assert_eq!(event.policy_name, "move scans");
    assert_eq!(event.action, ActionType::MoveQueryToGroup);
    assert_eq!(event.outcome, AuditOutcome::Failed("move rejected".to_string()));
    assert!(event.created_at_ms > 0);
}

#[test]
fn test_event_ids_are_unique() {
    let a = build_audit_event("q1", 1, "p", ActionType::CancelQuery, AuditOutcome::Applied);
    let b = build_audit_event("q1", 1, "p", ActionType::CancelQuery, AuditOutcome::Applied);
    assert_ne!(a.event_id, b.event_id);
}
