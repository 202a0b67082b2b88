//! Background persistence tasks and startup restore.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::postgres::PostgresPersistence;
use crate::domain::PoolEvent;
use crate::error::GatewayError;
use crate::service::PoolService;

/// How often the snapshot retention sweep runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Reloads the newest pool snapshots and the newest ledger snapshot into
/// the service. Returns the number of pools restored.
///
/// # Errors
///
/// Returns a [`GatewayError::PersistenceError`] if the snapshots cannot be
/// read.
pub async fn restore(
    persistence: &PostgresPersistence,
    service: &PoolService,
) -> Result<usize, GatewayError> {
    let snapshots = persistence.load_latest_snapshots().await?;
    let ledger = persistence.load_latest_ledger().await?;
    if snapshots.is_empty() && ledger.is_none() {
        tracing::info!("no snapshots found, starting empty");
        return Ok(0);
    }

    let count = snapshots.len();
    for snapshot in &snapshots {
        tracing::debug!(
            pool_id = %snapshot.pool_id,
            state = %snapshot.state,
            at = %snapshot.snapshot_at,
            "restoring pool"
        );
    }
    if let Some(ledger) = &ledger {
        tracing::info!(ledger_snapshot = ledger.id, at = %ledger.snapshot_at, "restoring ledger");
    }
    service
        .restore(
            snapshots.into_iter().map(|snapshot| snapshot.entry).collect(),
            ledger.map(|snapshot| snapshot.ledger),
        )
        .await;
    Ok(count)
}

/// Writes one consistent snapshot of every pool and the ledger.
///
/// # Errors
///
/// Returns a [`GatewayError::PersistenceError`] on database failure.
pub async fn persist_snapshot(
    persistence: &PostgresPersistence,
    service: &PoolService,
) -> Result<usize, GatewayError> {
    let (entries, ledger) = service.snapshot().await;
    persistence.save_snapshot(&entries, &ledger).await
}

/// Appends every event published on the bus to the `events` table.
/// Write failures are logged and skipped.
pub fn spawn_event_log(
    persistence: PostgresPersistence,
    mut event_rx: broadcast::Receiver<PoolEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    if let Err(err) = persistence.save_event(&event).await {
                        tracing::warn!(
                            pool_id = %event.pool_id(),
                            event_type = event.event_type_str(),
                            error = %err,
                            "failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event log fell behind, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("event log task stopped");
    })
}

/// Snapshots all pools and the ledger every `interval`.
pub fn spawn_snapshots(
    persistence: PostgresPersistence,
    service: Arc<PoolService>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // a zero period makes `interval` panic
        let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match persist_snapshot(&persistence, &service).await {
                Ok(pools) => tracing::debug!(pools, "snapshot written"),
                Err(err) => tracing::warn!(error = %err, "snapshot failed"),
            }
        }
    })
}

/// Deletes snapshots older than `retain_days`, hourly.
pub fn spawn_cleanup(persistence: PostgresPersistence, retain_days: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            match persistence.delete_old_snapshots(retain_days).await {
                Ok(0) => {}
                Ok(deleted) => tracing::info!(deleted, retain_days, "old snapshots removed"),
                Err(err) => tracing::warn!(error = %err, "snapshot cleanup failed"),
            }
        }
    })
}
