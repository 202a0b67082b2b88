//! # stakepool-gateway
//!
//! REST API and WebSocket gateway for share pools: fixed-supply share
//! tokens backed by pooled assets, traded peer-to-peer through a one-order-
//! per-account book or against an optional bonding curve, and redeemed for
//! a pro-rata slice of the pool once the owner terminates it.
//!
//! The exchange rules live in [`engine`] and are plain synchronous Rust.
//! Everything above it is coordination: locking, events and transport.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── PoolService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── PoolRegistry (domain/)
//!     ├── SharePool, PoolFactory, InMemoryLedger (engine/)
//!     │
//!     └── PostgreSQL Persistence (optional)
//! ```

pub mod api;
pub mod app;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
