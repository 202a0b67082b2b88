//! Concurrent pool storage with per-pool fine-grained locking.
//!
//! [`PoolRegistry`] stores all pools in a `HashMap` where each entry is
//! individually protected by a [`tokio::sync::RwLock`]. Reads of the same
//! pool run concurrently, writes to different pools run concurrently, and
//! writes to one pool are serialized.
//!
//! Locks are taken in the order map, entry, ledger. Nothing holding the
//! ledger waits on the map or an entry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{OwnedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::PoolId;
use super::pool_entry::{PoolEntry, PoolSummary};
use crate::engine::PoolState;
use crate::error::GatewayError;

/// Central store for all pools.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<PoolId, Arc<RwLock<PoolEntry>>>>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new pool entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if a pool with the same
    /// ID already exists.
    pub async fn insert(&self, entry: PoolEntry) -> Result<PoolId, GatewayError> {
        self.reserve().await.insert(entry)
    }

    /// Takes the map write lock ahead of building an entry, so work done
    /// before the insert is never observed without the pool.
    pub async fn reserve(&self) -> PoolSlot<'_> {
        PoolSlot {
            map: self.pools.write().await,
        }
    }

    /// Inserts or replaces an entry. Used when restoring snapshots.
    pub async fn upsert(&self, entry: PoolEntry) {
        let pool_id = entry.pool_id;
        self.pools
            .write()
            .await
            .insert(pool_id, Arc::new(RwLock::new(entry)));
    }

    /// Returns the pool entry behind its per-pool lock.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if no pool with the given ID
    /// exists.
    pub async fn get(&self, pool_id: PoolId) -> Result<Arc<RwLock<PoolEntry>>, GatewayError> {
        let map = self.pools.read().await;
        map.get(&pool_id)
            .cloned()
            .ok_or(GatewayError::PoolNotFound(*pool_id.as_uuid()))
    }

    /// Returns summaries of all pools, oldest first, optionally filtered by
    /// lifecycle state.
    pub async fn list(&self, state_filter: Option<PoolState>) -> Vec<PoolSummary> {
        let map = self.pools.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            if let Some(state) = state_filter
                && entry.pool.state() != state
            {
                continue;
            }
            summaries.push(PoolSummary::from(&*entry));
        }
        summaries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.pool_id.as_uuid().cmp(b.pool_id.as_uuid()))
        });
        summaries
    }

    /// Read-locks the map and then every entry in pool-id order. While the
    /// returned guard lives no pool can be inserted or mutated.
    pub async fn freeze(&self) -> FrozenPools<'_> {
        let map = self.pools.read().await;
        let mut locks: Vec<_> = map.iter().map(|(id, lock)| (*id, Arc::clone(lock))).collect();
        locks.sort_by(|(a, _), (b, _)| a.as_uuid().cmp(b.as_uuid()));
        let mut entries = Vec::with_capacity(locks.len());
        for (_, lock) in locks {
            entries.push(lock.read_owned().await);
        }
        FrozenPools { _map: map, entries }
    }

    /// Returns the number of pools in the registry.
    pub async fn len(&self) -> usize {
        self.pools.read().await.len()
    }

    /// Returns `true` if the registry contains no pools.
    pub async fn is_empty(&self) -> bool {
        self.pools.read().await.is_empty()
    }
}

/// Exclusive hold on the registry map for one insert.
#[derive(Debug)]
pub struct PoolSlot<'a> {
    map: RwLockWriteGuard<'a, HashMap<PoolId, Arc<RwLock<PoolEntry>>>>,
}

impl PoolSlot<'_> {
    /// Inserts the entry and releases the map.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if a pool with the same
    /// ID already exists.
    pub fn insert(mut self, entry: PoolEntry) -> Result<PoolId, GatewayError> {
        let pool_id = entry.pool_id;
        if self.map.contains_key(&pool_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "pool {pool_id} already exists"
            )));
        }
        self.map.insert(pool_id, Arc::new(RwLock::new(entry)));
        Ok(pool_id)
    }
}

/// Every pool entry read-locked at once.
#[derive(Debug)]
pub struct FrozenPools<'a> {
    _map: RwLockReadGuard<'a, HashMap<PoolId, Arc<RwLock<PoolEntry>>>>,
    entries: Vec<OwnedRwLockReadGuard<PoolEntry>>,
}

impl FrozenPools<'_> {
    /// Clones the frozen entries, ordered by pool id.
    #[must_use]
    pub fn entries(&self) -> Vec<PoolEntry> {
        self.entries.iter().map(|entry| (**entry).clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::engine::{AccountId, InMemoryLedger, InitParams, SharePool, TokenId};

    fn make_pool_entry() -> PoolEntry {
        let pool_id = PoolId::new();
        let pool = SharePool::new(
            pool_id.account(),
            AccountId::from("owner"),
            TokenId::from("PAY"),
            "Pool",
            "P",
        );
        PoolEntry::new(pool_id, pool)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = PoolRegistry::new();
        let entry = make_pool_entry();
        let id = entry.pool_id;

        let Ok(inserted) = registry.insert(entry).await else {
            panic!("insert failed");
        };
        assert_eq!(inserted, id);
        assert!(registry.get(id).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let registry = PoolRegistry::new();
        let entry = make_pool_entry();
        let _ = registry.insert(entry.clone()).await;
        assert!(registry.insert(entry).await.is_err());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = PoolRegistry::new();
        let result = registry.get(PoolId::new()).await;
        assert!(matches!(result, Err(GatewayError::PoolNotFound(_))));
    }

    #[tokio::test]
    async fn list_filters_by_state() {
        let registry = PoolRegistry::new();
        let _ = registry.insert(make_pool_entry()).await;

        let mut initialized = make_pool_entry();
        let owner = AccountId::from("owner");
        let Ok(_) = initialized.pool.initialize(&owner, InitParams::default()) else {
            panic!("initialize failed");
        };
        let _ = registry.insert(initialized).await;

        assert_eq!(registry.list(None).await.len(), 2);
        assert_eq!(registry.list(Some(PoolState::Created)).await.len(), 1);
        assert_eq!(registry.list(Some(PoolState::Initialized)).await.len(), 1);
        assert!(registry.list(Some(PoolState::Terminated)).await.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_entry() {
        let registry = PoolRegistry::new();
        let mut entry = make_pool_entry();
        let id = entry.pool_id;
        let _ = registry.insert(entry.clone()).await;

        let mut ledger = InMemoryLedger::new();
        let owner = AccountId::from("owner");
        let Ok(_) = entry.pool.abort(&mut ledger, &owner) else {
            panic!("abort failed");
        };
        registry.upsert(entry).await;

        let Ok(lock) = registry.get(id).await else {
            panic!("pool missing");
        };
        assert_eq!(lock.read().await.pool.state(), PoolState::Terminated);
        assert_eq!(registry.freeze().await.entries().len(), 1);
    }

    #[tokio::test]
    async fn frozen_registry_blocks_writers() {
        let registry = Arc::new(PoolRegistry::new());
        let entry = make_pool_entry();
        let id = entry.pool_id;
        let _ = registry.insert(entry).await;
        let Ok(lock) = registry.get(id).await else {
            panic!("pool missing");
        };

        let frozen = registry.freeze().await;
        assert!(lock.try_write().is_err());

        let inserter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.insert(make_pool_entry()).await })
        };
        tokio::task::yield_now().await;
        assert!(!inserter.is_finished());
        assert_eq!(frozen.entries().len(), 1);

        drop(frozen);
        let Ok(Ok(_)) = inserter.await else {
            panic!("insert after freeze failed");
        };
        assert!(lock.try_write().is_ok());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = PoolRegistry::new();
        assert!(registry.is_empty().await);
        let _ = registry.insert(make_pool_entry()).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
    }
}
