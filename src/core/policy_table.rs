//! Versioned policy store shared between the policy-distribution path and the
//! scheduler worker.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::core::action::{ActionType, RuntimeActionContext};
use crate::core::policy::{PolicyId, SchedulingPolicy};

/// A complete set of intended policies, keyed by id.
pub type PolicySnapshot = BTreeMap<PolicyId, Arc<SchedulingPolicy>>;

/// What one full sync changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Ids seen for the first time.
    pub inserted: usize,
    /// Ids replaced by a strictly newer version.
    pub replaced: usize,
    /// Ids whose incoming version was not newer.
    pub ignored: usize,
    /// Ids dropped because the snapshot no longer contains them.
    pub removed: usize,
}

/// Policy table guarded by a reader-writer lock.
///
/// Entries are ordered by policy id, which makes matching order, and with it
/// the equal-priority tie-break, deterministic: the lower id is seen first.
#[derive(Debug, Default)]
pub struct PolicyTable {
    entries: RwLock<PolicySnapshot>,
}

impl PolicyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a full snapshot: upsert newer versions, then prune ids the
    /// snapshot no longer names. Both phases run under one write lock.
    pub fn upsert_and_prune(&self, snapshot: &PolicySnapshot) -> SyncSummary {
        let mut summary = SyncSummary::default();
        let mut entries = self.entries.write();

        for (id, policy) in snapshot {
            match entries.entry(*id) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(policy));
                    summary.inserted += 1;
                }
                Entry::Occupied(mut slot) => {
                    if policy.version() > slot.get().version() {
                        slot.insert(Arc::clone(policy));
                        summary.replaced += 1;
                    } else {
                        summary.ignored += 1;
                    }
                }
            }
        }

        let before = entries.len();
        entries.retain(|id, _| snapshot.contains_key(id));
        summary.removed = before - entries.len();
        drop(entries);

        debug!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            ignored = summary.ignored,
            removed = summary.removed,
            "workload policies synced"
        );
        summary
    }

    /// Every policy matching `ctx`, in ascending id order, paired with its
    /// conflict bucket.
    pub fn snapshot_match(
        &self,
        ctx: &RuntimeActionContext<'_>,
    ) -> Vec<(ActionType, Arc<SchedulingPolicy>)> {
        let entries = self.entries.read();
        entries
            .values()
            .filter(|policy| policy.is_match(ctx))
            .map(|policy| (policy.primary_action_type(), Arc::clone(policy)))
            .collect()
    }

    /// Current policy for `id`.
    #[must_use]
    pub fn get(&self, id: PolicyId) -> Option<Arc<SchedulingPolicy>> {
        self.entries.read().get(&id).cloned()
    }

    /// All stored ids, ascending.
    #[must_use]
    pub fn ids(&self) -> Vec<PolicyId> {
        self.entries.read().keys().copied().collect()
    }

    /// Number of stored policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
