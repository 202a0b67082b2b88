//! stakepool-gateway server entry point.
//!
//! Loads configuration, optionally restores state from PostgreSQL, and
//! serves the REST and WebSocket endpoints until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use stakepool_gateway::app::build_app;
use stakepool_gateway::app_state::AppState;
use stakepool_gateway::config::{GatewayConfig, LogFormat};
use stakepool_gateway::engine::{AccountId, TokenId};
use stakepool_gateway::persistence::{PostgresPersistence, tasks};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting stakepool-gateway");

    let app_state = AppState::from_config(&config);
    let service = &app_state.pool_service;

    let persistence = if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config)
            .await
            .context("failed to initialise persistence")?;
        let restored = tasks::restore(&persistence, service)
            .await
            .context("failed to restore snapshots")?;
        tracing::info!(restored, "state restored");
        Some(persistence)
    } else {
        tracing::info!("persistence disabled, state is in-memory only");
        None
    };

    if let Some(persistence) = &persistence {
        if config.event_log_enabled {
            tasks::spawn_event_log(persistence.clone(), app_state.event_bus.subscribe());
        }
        tasks::spawn_snapshots(
            persistence.clone(),
            Arc::clone(service),
            Duration::from_secs(config.snapshot_interval_secs),
        );
        if config.cleanup_after_days > 0 {
            tasks::spawn_cleanup(persistence.clone(), config.cleanup_after_days);
        }
    }

    if let Some(owner) = &config.factory_root_owner {
        let root = service
            .bootstrap_root_pool(
                AccountId::from(owner.as_str()),
                TokenId::from(config.factory_fee_token.as_str()),
            )
            .await
            .context("failed to bootstrap root pool")?;
        tracing::info!(pool_id = %root, "root pool is the factory beneficiary");
    }

    let app = build_app(app_state.clone(), &config);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(persistence) = &persistence {
        match tasks::persist_snapshot(persistence, &app_state.pool_service).await {
            Ok(pools) => tracing::info!(pools, "final snapshot written"),
            Err(err) => tracing::warn!(error = %err, "final snapshot failed"),
        }
    }
    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
