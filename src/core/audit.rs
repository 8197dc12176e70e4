//! Audit trail of dispatched governance actions.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::core::action::ActionType;
use crate::core::policy::PolicyId;
use crate::util::clock::now_ms;

/// How an action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The collaborator applied the action.
    Applied,
    /// The action failed with a reason.
    Failed(String),
}

/// One dispatched action.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Query the action targeted.
    pub query_id: String,
    /// Policy that triggered it.
    pub policy_id: PolicyId,
    /// Display name of the policy.
    pub policy_name: String,
    /// Action taken.
    pub action: ActionType,
    /// Result reported by the collaborator.
    pub outcome: AuditOutcome,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Bounded in-memory audit sink.
///
/// Clones share the same buffer, so a caller can keep a handle for reading
/// while the scheduler owns another for writing.
#[derive(Debug, Clone)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build an audit event stamped with a fresh id and the current time.
pub fn build_audit_event(
    query_id: impl Into<String>,
    policy_id: PolicyId,
    policy_name: impl Into<String>,
    action: ActionType,
    outcome: AuditOutcome,
) -> AuditEvent {
    AuditEvent {
        event_id: Uuid::new_v4().to_string(),
        query_id: query_id.into(),
        policy_id,
        policy_name: policy_name.into(),
        action,
        outcome,
        created_at_ms: now_ms(),
    }
}
