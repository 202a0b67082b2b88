//! Share pool exchange engine.
//!
//! Pure, synchronous state machine: no I/O, no locks, no globals. Every
//! operation takes the pool and the asset ledger explicitly and either
//! applies in full or fails without side effects.
//!
//! - [`account`]: account and token identifiers
//! - [`ledger`]: asset ledger adapter trait and in-memory implementation
//! - [`shares`]: per-account share balances
//! - [`order_book`]: one-order-per-account arena
//! - [`bonding`]: constant-product primary issuance
//! - [`lifecycle`]: pool states and the operation table
//! - [`tax`]: per-mille trade tax
//! - [`pool`]: the [`SharePool`] itself
//! - [`factory`]: fee-charging pool issuance

pub mod account;
pub mod bonding;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod lifecycle;
pub mod order_book;
pub mod pool;
pub mod shares;
pub mod tax;

pub use account::{AccountId, TokenId};
pub use bonding::BondingCurve;
pub use error::PoolError;
pub use factory::PoolFactory;
pub use ledger::{AssetLedger, InMemoryLedger, LedgerError};
pub use lifecycle::{Operation, PoolState};
pub use order_book::{Order, OrderBook, OrderSide};
pub use pool::{
    Asset, CurveTrade, Fill, InitParams, MAX_SHARE_PRECISION, Payout, SharePool, Termination,
    Withdrawal,
};
pub use shares::ShareLedger;
pub use tax::{TAX_DENOMINATOR, TaxRate};
