//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::{EventBus, PoolRegistry};
use crate::engine::{AccountId, InMemoryLedger, PoolFactory, TokenId};
use crate::service::PoolService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pool service for all business logic.
    pub pool_service: Arc<PoolService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds a fresh in-memory state: empty registry, empty ledger and a
    /// factory charging the configured issue fee.
    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        let registry = Arc::new(PoolRegistry::new());
        let event_bus = EventBus::new(config.event_bus_capacity);
        let factory = PoolFactory::new(
            AccountId::from(config.factory_owner.as_str()),
            config.factory_issue_fee,
            TokenId::new(config.factory_fee_token.clone()),
        );
        let pool_service = Arc::new(PoolService::new(
            registry,
            event_bus.clone(),
            InMemoryLedger::new(),
            factory,
        ));
        Self {
            pool_service,
            event_bus,
        }
    }
}
