//! In-memory query registry and a resource context with atomic counters.
//!
//! Embedders with their own query bookkeeping implement
//! [`QueryRegistry`] and [`ResourceContext`] directly; this backend serves
//! tests, benches and single-process setups.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::core::{QueryRegistry, QueryStats, ResourceContext, SchedulerError};

/// A live query whose usage counters are updated by the execution engine.
#[derive(Debug)]
pub struct TrackedQuery {
    query_id: String,
    started: Instant,
    workload_group_id: Option<u64>,
    scan_rows: AtomicI64,
    scan_bytes: AtomicI64,
    memory_bytes: AtomicI64,
    cancel_reason: Mutex<Option<String>>,
    cancel_calls: AtomicU64,
    target_group: Mutex<Option<String>>,
    move_calls: AtomicU64,
    reject_actions: AtomicBool,
}

impl TrackedQuery {
    /// A query starting now with zeroed counters.
    pub fn new(query_id: impl Into<String>) -> Self {
        Self::started_at(query_id, Instant::now())
    }

    /// A query that started at `started`.
    pub fn started_at(query_id: impl Into<String>, started: Instant) -> Self {
        Self {
            query_id: query_id.into(),
            started,
            workload_group_id: None,
            scan_rows: AtomicI64::new(0),
            scan_bytes: AtomicI64::new(0),
            memory_bytes: AtomicI64::new(0),
            cancel_reason: Mutex::new(None),
            cancel_calls: AtomicU64::new(0),
            target_group: Mutex::new(None),
            move_calls: AtomicU64::new(0),
            reject_actions: AtomicBool::new(false),
        }
    }

    /// Place the query in a workload group.
    #[must_use]
    pub fn in_group(mut self, workload_group_id: u64) -> Self {
        self.workload_group_id = Some(workload_group_id);
        self
    }

    /// Add scanned rows and bytes.
    pub fn record_scan(&self, rows: i64, bytes: i64) {
        self.scan_rows.fetch_add(rows, Ordering::Relaxed);
        self.scan_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Set current memory usage.
    pub fn set_memory_bytes(&self, bytes: i64) {
        self.memory_bytes.store(bytes, Ordering::Relaxed);
    }

    /// Make every subsequent cancel and move fail.
    pub fn reject_actions(&self, reject: bool) {
        self.reject_actions.store(reject, Ordering::Relaxed);
    }

    /// Reason given by the first cancellation, if any.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<String> {
        self.cancel_reason.lock().clone()
    }

    /// Whether the query has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_reason.lock().is_some()
    }

    /// Number of cancel requests received.
    #[must_use]
    pub fn cancel_calls(&self) -> u64 {
        self.cancel_calls.load(Ordering::Relaxed)
    }

    /// Group the query was last moved to.
    #[must_use]
    pub fn target_group(&self) -> Option<String> {
        self.target_group.lock().clone()
    }

    /// Number of move requests received.
    #[must_use]
    pub fn move_calls(&self) -> u64 {
        self.move_calls.load(Ordering::Relaxed)
    }

    fn check_accepts(&self, what: &str) -> Result<(), SchedulerError> {
        if self.reject_actions.load(Ordering::Relaxed) {
            return Err(SchedulerError::ActionFailed {
                query_id: self.query_id.clone(),
                reason: format!("{what} rejected"),
            });
        }
        Ok(())
    }
}

impl ResourceContext for TrackedQuery {
    fn query_id(&self) -> &str {
        &self.query_id
    }

    fn workload_group_id(&self) -> Option<u64> {
        self.workload_group_id
    }

    fn stats(&self) -> QueryStats {
        QueryStats {
            query_time_ms: i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX),
            scan_rows: self.scan_rows.load(Ordering::Relaxed),
            scan_bytes: self.scan_bytes.load(Ordering::Relaxed),
            memory_bytes: self.memory_bytes.load(Ordering::Relaxed),
        }
    }

    fn cancel(&self, reason: &str) -> Result<(), SchedulerError> {
        self.cancel_calls.fetch_add(1, Ordering::Relaxed);
        self.check_accepts("cancel")?;
        self.cancel_reason
            .lock()
            .get_or_insert_with(|| reason.to_string());
        Ok(())
    }

    fn move_to_group(&self, group: &str) -> Result<(), SchedulerError> {
        self.move_calls.fetch_add(1, Ordering::Relaxed);
        self.check_accepts("move")?;
        *self.target_group.lock() = Some(group.to_string());
        Ok(())
    }
}

/// Registry owning every live [`TrackedQuery`].
///
/// `complete` drops the registry's strong reference, after which handles
/// previously handed to the scheduler no longer upgrade.
#[derive(Debug, Default)]
pub struct InMemoryQueryRegistry {
    queries: RwLock<HashMap<String, Arc<TrackedQuery>>>,
}

impl InMemoryQueryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live query, replacing any previous query with the same id.
    pub fn register(&self, query: TrackedQuery) -> Arc<TrackedQuery> {
        let query = Arc::new(query);
        self.queries
            .write()
            .insert(query.query_id.clone(), Arc::clone(&query));
        query
    }

    /// Mark a query finished and release the registry's ownership.
    pub fn complete(&self, query_id: &str) -> Option<Arc<TrackedQuery>> {
        self.queries.write().remove(query_id)
    }

    /// Look up a live query.
    #[must_use]
    pub fn get(&self, query_id: &str) -> Option<Arc<TrackedQuery>> {
        self.queries.read().get(query_id).cloned()
    }

    /// Number of live queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queries.read().len()
    }

    /// Whether no query is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queries.read().is_empty()
    }
}

impl QueryRegistry for InMemoryQueryRegistry {
    fn live_query_contexts(&self) -> Vec<Weak<dyn ResourceContext>> {
        self.queries
            .read()
            .values()
            .map(|query| {
                let ctx: Arc<dyn ResourceContext> = Arc::clone(query) as Arc<dyn ResourceContext>;
                Arc::downgrade(&ctx)
            })
            .collect()
    }
}
