//! Pool entry combining a [`SharePool`] with gateway metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PoolId;
use crate::engine::{AccountId, PoolState, SharePool, TokenId};

/// Aggregate wrapping an engine [`SharePool`] with gateway metadata.
///
/// Each pool in the registry is stored as a `PoolEntry`. The `pool` field
/// holds the live engine state (shares, orders, assets) while the remaining
/// fields track operational metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Unique pool identifier (immutable after issuance).
    pub pool_id: PoolId,

    /// The engine instance. Replaced wholesale on every successful call.
    pub pool: SharePool,

    /// Issuance timestamp.
    pub created_at: DateTime<Utc>,

    /// Timestamp of last state mutation.
    pub last_modified_at: DateTime<Utc>,

    /// Number of order fills and curve trades.
    pub trade_count: u64,

    /// Cumulative traded value in payment-asset units, tax excluded.
    pub trade_volume: u128,
}

impl PoolEntry {
    /// Creates a new `PoolEntry` for a freshly issued pool.
    #[must_use]
    pub fn new(pool_id: PoolId, pool: SharePool) -> Self {
        let now = Utc::now();
        Self {
            pool_id,
            pool,
            created_at: now,
            last_modified_at: now,
            trade_count: 0,
            trade_volume: 0,
        }
    }

    /// Marks the entry as modified now.
    pub fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }

    /// Records one trade worth `value` payment-asset units.
    pub fn record_trade(&mut self, value: u128) {
        self.trade_count = self.trade_count.saturating_add(1);
        self.trade_volume = self.trade_volume.saturating_add(value);
        self.touch();
    }
}

/// Lightweight summary of a pool for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Display name.
    pub name: String,
    /// Share symbol.
    pub symbol: String,
    /// Owning account.
    pub owner: AccountId,
    /// Settlement token.
    pub payment_asset: TokenId,
    /// Lifecycle state.
    pub state: PoolState,
    /// Issuance timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of trades executed.
    pub trade_count: u64,
}

impl From<&PoolEntry> for PoolSummary {
    fn from(entry: &PoolEntry) -> Self {
        Self {
            pool_id: entry.pool_id,
            name: entry.pool.name().to_string(),
            symbol: entry.pool.symbol().to_string(),
            owner: entry.pool.owner().clone(),
            payment_asset: entry.pool.payment_asset().clone(),
            state: entry.pool.state(),
            created_at: entry.created_at,
            trade_count: entry.trade_count,
        }
    }
}
