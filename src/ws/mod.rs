//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` streams [`crate::domain::PoolEvent`]s filtered by
//! pool and event type, and answers read-only state queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
