//! Reduces the policies matched for one query to at most one policy per action
//! type and settles the move-versus-cancel conflict.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::action::ActionType;
use crate::core::policy::SchedulingPolicy;

/// Policies selected for one query, at most one per action type.
#[derive(Debug, Default, Clone)]
pub struct ResolvedPolicies {
    slots: BTreeMap<ActionType, Arc<SchedulingPolicy>>,
    conflict_resolved: bool,
}

impl ResolvedPolicies {
    /// Selected policies in ascending action-type order.
    pub fn iter(&self) -> impl Iterator<Item = (ActionType, &Arc<SchedulingPolicy>)> {
        self.slots.iter().map(|(t, p)| (*t, p))
    }

    /// Action types that survived resolution, ascending.
    #[must_use]
    pub fn action_types(&self) -> Vec<ActionType> {
        self.slots.keys().copied().collect()
    }

    /// Policy holding the slot for `action_type`.
    #[must_use]
    pub fn get(&self, action_type: ActionType) -> Option<&Arc<SchedulingPolicy>> {
        self.slots.get(&action_type)
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of surviving slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether a move and a cancel competed and one was dropped.
    #[must_use]
    pub const fn conflict_resolved(&self) -> bool {
        self.conflict_resolved
    }
}

/// Resolve matched policies, given in table order.
///
/// Within one action type the strictly higher priority wins and ties keep the
/// policy seen first. If both a move and a cancel survive, cancel wins unless
/// the move has strictly higher priority.
pub fn resolve<I>(matched: I) -> ResolvedPolicies
where
    I: IntoIterator<Item = (ActionType, Arc<SchedulingPolicy>)>,
{
    let mut slots: BTreeMap<ActionType, Arc<SchedulingPolicy>> = BTreeMap::new();
    for (action_type, policy) in matched {
        match slots.get(&action_type) {
            Some(current) if policy.priority() <= current.priority() => {}
            _ => {
                slots.insert(action_type, policy);
            }
        }
    }

    let mut conflict_resolved = false;
    if let (Some(mv), Some(cancel)) = (
        slots.get(&ActionType::MoveQueryToGroup),
        slots.get(&ActionType::CancelQuery),
    ) {
        let loser = if cancel.priority() >= mv.priority() {
            ActionType::MoveQueryToGroup
        } else {
            ActionType::CancelQuery
        };
        slots.remove(&loser);
        conflict_resolved = true;
    }

    ResolvedPolicies {
        slots,
        conflict_resolved,
    }
}
