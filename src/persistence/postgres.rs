//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use uuid::Uuid;

use super::models::{LedgerSnapshot, PoolSnapshot};
use crate::config::GatewayConfig;
use crate::domain::PoolEvent;
use crate::domain::pool_entry::PoolEntry;
use crate::engine::InMemoryLedger;
use crate::error::GatewayError;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

fn db_error(err: impl std::fmt::Display) -> GatewayError {
    GatewayError::PersistenceError(err.to_string())
}

/// Instant before which snapshots expire, if any.
fn retention_cutoff(now: DateTime<Utc>, days: u64) -> Option<DateTime<Utc>> {
    if days == 0 {
        return None;
    }
    let window = TimeDelta::try_days(i64::try_from(days).ok()?)?;
    now.checked_sub_signed(window)
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from the configuration and applies the
    /// bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(db_error)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(db_error)?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "database connected and migrated"
        );
        Ok(Self::new(pool))
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_event(&self, event: &PoolEvent) -> Result<i64, GatewayError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (pool_id, event_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(*event.pool_id().as_uuid())
        .bind(event.event_type_str())
        .bind(Json(event))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Writes one snapshot row per pool plus the ledger in a single
    /// transaction, so a restore never pairs pools with a foreign ledger.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure;
    /// nothing is written in that case.
    pub async fn save_snapshot(
        &self,
        entries: &[PoolEntry],
        ledger: &InMemoryLedger,
    ) -> Result<usize, GatewayError> {
        let snapshot_at = Utc::now();
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO pool_snapshots (pool_id, state, state_json, snapshot_at) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(*entry.pool_id.as_uuid())
            .bind(entry.pool.state().to_string())
            .bind(Json(entry))
            .bind(snapshot_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        sqlx::query("INSERT INTO ledger_snapshots (balances_json, snapshot_at) VALUES ($1, $2)")
            .bind(Json(ledger))
            .bind(snapshot_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(entries.len())
    }

    /// Loads the latest snapshot for each pool using `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// if a stored entry no longer decodes.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<PoolSnapshot>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, Uuid, String, Json<PoolEntry>, DateTime<Utc>)>(
            "SELECT DISTINCT ON (pool_id) id, pool_id, state, state_json, snapshot_at \
             FROM pool_snapshots ORDER BY pool_id, snapshot_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, pool_id, state, Json(entry), snapshot_at)| PoolSnapshot {
                id,
                pool_id,
                state,
                entry,
                snapshot_at,
            })
            .collect())
    }

    /// Loads the most recent ledger snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_latest_ledger(&self) -> Result<Option<LedgerSnapshot>, GatewayError> {
        let row = sqlx::query_as::<_, (i64, Json<InMemoryLedger>, DateTime<Utc>)>(
            "SELECT id, balances_json, snapshot_at FROM ledger_snapshots \
             ORDER BY snapshot_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|(id, Json(ledger), snapshot_at)| LedgerSnapshot {
            id,
            ledger,
            snapshot_at,
        }))
    }

    /// Deletes snapshots older than the given number of days. The newest
    /// snapshot of each pool and the newest ledger snapshot are always kept.
    /// Zero days, or a window reaching past the earliest representable
    /// time, deletes nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, GatewayError> {
        let Some(cutoff) = retention_cutoff(Utc::now(), before_days) else {
            return Ok(0);
        };

        let pools = sqlx::query(
            "DELETE FROM pool_snapshots s WHERE s.snapshot_at < $1 \
             AND s.snapshot_at < (SELECT max(snapshot_at) FROM pool_snapshots WHERE pool_id = s.pool_id)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let ledgers = sqlx::query(
            "DELETE FROM ledger_snapshots WHERE snapshot_at < $1 \
             AND id <> (SELECT id FROM ledger_snapshots ORDER BY snapshot_at DESC, id DESC LIMIT 1)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(pools.rows_affected() + ledgers.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn retention_cutoff_counts_back_whole_days() {
        let now = Utc::now();
        let Some(cutoff) = retention_cutoff(now, 30) else {
            panic!("expected a cutoff");
        };
        assert_eq!(now - cutoff, TimeDelta::days(30));
    }

    #[test]
    fn zero_or_huge_retention_never_expires() {
        let now = Utc::now();
        assert!(retention_cutoff(now, 0).is_none());
        assert!(retention_cutoff(now, 1_000_000_000_000).is_none());
        assert!(retention_cutoff(now, u64::MAX).is_none());
    }
}
