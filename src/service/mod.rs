//! Service layer: business logic orchestration.
//!
//! [`PoolService`] serializes calls per pool, runs them against the engine
//! and the shared token ledger, and emits events through the
//! [`super::domain::EventBus`].

pub mod pool_service;

pub use pool_service::{FactoryFee, PoolService};
