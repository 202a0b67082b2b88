//! Persistence layer: PostgreSQL event log, pool snapshots and ledger
//! snapshots.
//!
//! Persistence is optional. When enabled, [`tasks`] spawns an event-log
//! writer fed by the event bus, a periodic snapshot writer and a cleanup
//! sweep, and [`tasks::restore`] reloads the latest snapshots on startup.

pub mod models;
pub mod postgres;
pub mod tasks;

pub use postgres::PostgresPersistence;
