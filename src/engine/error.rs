//! Exchange engine error taxonomy.

use super::ledger::LedgerError;
use super::lifecycle::{Operation, PoolState};

/// Reason a pool operation was rejected.
///
/// A rejected operation never leaves partial state behind: the pool and the
/// ledger are exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The operation is not legal in the pool's current lifecycle state.
    #[error("{operation} is not available in current state ({state})")]
    InvalidState {
        /// Operation that was attempted.
        operation: Operation,
        /// State the pool was in.
        state: PoolState,
    },

    /// A privileged operation was invoked by someone other than the owner.
    #[error("caller is not the owner")]
    NotOwner,

    /// The owner may not trade against the bonding reserve.
    #[error("owner cannot trade against the bonding reserve")]
    OwnerNotAllowed,

    /// The caller does not hold enough visible shares.
    #[error("insufficient shares: required {required}, available {available}")]
    InsufficientShares {
        /// Shares requested.
        required: u128,
        /// Shares held.
        available: u128,
    },

    /// A fill exceeds what is left on the counterparty's order.
    #[error("insufficient amount: requested {requested}, remaining {remaining}")]
    InsufficientAmount {
        /// Fill requested.
        requested: u128,
        /// Amount left on the order.
        remaining: u128,
    },

    /// The caller already has an open order.
    #[error("active order, cancel first")]
    ActiveOrder,

    /// The account has no open order.
    #[error("no active order for {0}")]
    NoActiveOrder(String),

    /// No order is stored at the given index.
    #[error("order {0} not found")]
    OrderNotFound(usize),

    /// The payment asset was offered as a pooled asset.
    #[error("payment asset cannot be added as asset")]
    PaymentAssetNotAllowed,

    /// The caller has nothing to withdraw.
    #[error("no shares available")]
    NoSharesAvailable,

    /// The bonding curve output violated the caller's bound.
    #[error("slippage exceeded: expected at least {minimum}, got {actual}")]
    SlippageExceeded {
        /// Minimum acceptable output.
        minimum: u128,
        /// Output the curve would produce.
        actual: u128,
    },

    /// The pool was initialized without a bonding reserve.
    #[error("bonding curve is not enabled for this pool")]
    CurveDisabled,

    /// The bonding curve cannot pay out the requested amount.
    #[error("insufficient liquidity in bonding curve")]
    InsufficientLiquidity,

    /// A price or quantity argument is unusable.
    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),

    /// Tax rate above 100%.
    #[error("invalid tax rate {0}: must not exceed 1000 per mille")]
    InvalidTaxRate(u32),

    /// Share precision outside the supported range.
    #[error("invalid share precision {0}: must not exceed {max}", max = super::pool::MAX_SHARE_PRECISION)]
    InvalidPrecision(u32),

    /// The caller tried to accept their own order.
    #[error("cannot accept own order")]
    SelfTrade,

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow")]
    Overflow,

    /// The asset ledger rejected a transfer.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
