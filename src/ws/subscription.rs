//! Per-connection subscription manager.
//!
//! Tracks which pools, and optionally which event types, a WebSocket client
//! wants, and filters the event stream server-side.

use std::collections::HashSet;

use crate::domain::{PoolEvent, PoolId};

/// Subscriptions of a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    pool_ids: HashSet<PoolId>,
    all_pools: bool,
    /// Empty means every event type.
    event_types: HashSet<String>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds pools to the subscription set; `wildcard` subscribes to every
    /// pool. A non-empty `event_types` replaces the event-type filter.
    pub fn subscribe(&mut self, ids: &[PoolId], wildcard: bool, event_types: &[String]) {
        self.all_pools |= wildcard;
        self.pool_ids.extend(ids.iter().copied());
        if !event_types.is_empty() {
            self.event_types = event_types.iter().cloned().collect();
        }
    }

    /// Removes pools from the subscription set; `wildcard` drops the
    /// all-pools subscription.
    pub fn unsubscribe(&mut self, ids: &[PoolId], wildcard: bool) {
        if wildcard {
            self.all_pools = false;
        }
        for id in ids {
            self.pool_ids.remove(id);
        }
    }

    /// Returns `true` if the event passes both the pool and the event-type
    /// filter.
    #[must_use]
    pub fn matches(&self, event: &PoolEvent) -> bool {
        let pool_ok = self.all_pools || self.pool_ids.contains(&event.pool_id());
        let type_ok =
            self.event_types.is_empty() || self.event_types.contains(event.event_type_str());
        pool_ok && type_ok
    }

    /// Number of explicitly subscribed pools.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pool_ids.len()
    }

    /// Returns `true` if the all-pools subscription is active.
    #[must_use]
    pub const fn is_subscribed_all(&self) -> bool {
        self.all_pools
    }

    /// Active event-type filter, sorted; empty when every type is kept.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.event_types.iter().cloned().collect();
        types.sort();
        types
    }
}
