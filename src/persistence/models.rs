//! Decoded snapshot rows.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::pool_entry::PoolEntry;
use crate::engine::InMemoryLedger;

/// A pool snapshot row from the `pool_snapshots` table.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Pool that was snapshotted.
    pub pool_id: Uuid,
    /// Lifecycle state at snapshot time, for filtering without decoding.
    pub state: String,
    /// The full registry entry.
    pub entry: PoolEntry,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}

/// A ledger snapshot row from the `ledger_snapshots` table.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Every token balance at snapshot time.
    pub ledger: InMemoryLedger,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}
