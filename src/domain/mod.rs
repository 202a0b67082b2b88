//! Domain layer: pool identity, registry and event system.
//!
//! Wraps the engine's [`crate::engine::SharePool`] with gateway metadata
//! and provides concurrent storage and change broadcasting.

pub mod event_bus;
pub mod pool_entry;
pub mod pool_event;
pub mod pool_id;
pub mod pool_registry;

pub use event_bus::EventBus;
pub use pool_entry::{PoolEntry, PoolSummary};
pub use pool_event::{PoolEvent, TokenAmount};
pub use pool_id::PoolId;
pub use pool_registry::PoolRegistry;
