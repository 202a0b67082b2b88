//! Domain events reflecting pool state mutations.
//!
//! Every state change emits a [`PoolEvent`] through the [`super::EventBus`].
//! Events are broadcast to WebSocket subscribers and optionally persisted
//! to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PoolId;
use crate::engine::{OrderSide, Payout};

/// Token amount carried inside an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Token address.
    pub token: String,
    /// Amount (string-encoded u128).
    pub amount: String,
}

impl From<&Payout> for TokenAmount {
    fn from(payout: &Payout) -> Self {
        Self {
            token: payout.token.to_string(),
            amount: payout.amount.to_string(),
        }
    }
}

/// Domain event emitted after every state mutation.
///
/// Amounts are stored as `String` to preserve u128 precision when
/// serialized to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PoolEvent {
    /// A pool was issued by the factory.
    PoolIssued {
        /// Pool identifier.
        pool_id: PoolId,
        /// Owning account.
        owner: String,
        /// Settlement token.
        payment_asset: String,
        /// Display name.
        name: String,
        /// Share symbol.
        symbol: String,
        /// Issue fee paid to the beneficiary.
        fee_paid: String,
        /// Issuance timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The owner deposited an asset.
    AssetAdded {
        /// Pool identifier.
        pool_id: PoolId,
        /// Deposited token.
        token: String,
        /// Amount deposited.
        amount: String,
        /// Pooled amount after the deposit.
        total: String,
        /// Deposit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Supply, tax and precision were fixed.
    PoolInitialized {
        /// Pool identifier.
        pool_id: PoolId,
        /// Total share supply.
        total_share_supply: String,
        /// Tax in tenths of a percent.
        tax_rate: u32,
        /// Share precision.
        share_precision: u32,
        /// Whether shares are issued through a bonding curve.
        bonding: bool,
        /// Initialization timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A buy or sell order was opened.
    OrderOpened {
        /// Pool identifier.
        pool_id: PoolId,
        /// Order index.
        index: usize,
        /// Order owner.
        account: String,
        /// Buy or sell.
        side: OrderSide,
        /// Price per share.
        price: String,
        /// Share quantity.
        amount: String,
        /// Payment escrowed (zero for sells).
        escrow: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An order was partially or fully accepted.
    OrderFilled {
        /// Pool identifier.
        pool_id: PoolId,
        /// Order index.
        index: usize,
        /// Order owner.
        maker: String,
        /// Accepting account.
        taker: String,
        /// Side of the filled order.
        side: OrderSide,
        /// Shares exchanged.
        amount: String,
        /// Shares left on the order.
        remaining: String,
        /// Payment exchanged, tax excluded.
        value: String,
        /// Tax paid to the owner.
        tax: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An order was cancelled by its owner.
    OrderCancelled {
        /// Pool identifier.
        pool_id: PoolId,
        /// Order index.
        index: usize,
        /// Order owner.
        account: String,
        /// Side of the cancelled order.
        side: OrderSide,
        /// Shares returned (sell orders).
        shares_returned: String,
        /// Escrow refunded (buy orders).
        escrow_refunded: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Shares moved between accounts.
    SharesTransferred {
        /// Pool identifier.
        pool_id: PoolId,
        /// Sender.
        from: String,
        /// Recipient.
        to: String,
        /// Shares moved.
        amount: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A bonding-curve purchase or redemption.
    CurveTraded {
        /// Pool identifier.
        pool_id: PoolId,
        /// Trading account.
        account: String,
        /// `buy` for purchases, `sell` for redemptions.
        side: OrderSide,
        /// Shares issued or redeemed.
        shares: String,
        /// Payment in or out, tax excluded.
        payment: String,
        /// Tax paid to the owner.
        tax: String,
        /// Share reserve after the trade.
        reserve_shares: String,
        /// Payment reserve after the trade.
        reserve_payment: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The owner terminated the pool.
    PoolTerminated {
        /// Pool identifier.
        pool_id: PoolId,
        /// Per-asset settlement amounts.
        settlement: Vec<TokenAmount>,
        /// Unsold curve shares credited to the owner.
        curve_shares: String,
        /// Curve proceeds paid to the owner.
        curve_proceeds: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The owner aborted the pool before initialization.
    PoolAborted {
        /// Pool identifier.
        pool_id: PoolId,
        /// Deposits returned to the owner.
        refunds: Vec<TokenAmount>,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A shareholder withdrew their pro-rata slice.
    Withdrawn {
        /// Pool identifier.
        pool_id: PoolId,
        /// Withdrawing account.
        account: String,
        /// Shares burned.
        shares: String,
        /// Asset slices paid.
        payouts: Vec<TokenAmount>,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl PoolEvent {
    /// Returns the pool ID associated with this event.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        match self {
            Self::PoolIssued { pool_id, .. }
            | Self::AssetAdded { pool_id, .. }
            | Self::PoolInitialized { pool_id, .. }
            | Self::OrderOpened { pool_id, .. }
            | Self::OrderFilled { pool_id, .. }
            | Self::OrderCancelled { pool_id, .. }
            | Self::SharesTransferred { pool_id, .. }
            | Self::CurveTraded { pool_id, .. }
            | Self::PoolTerminated { pool_id, .. }
            | Self::PoolAborted { pool_id, .. }
            | Self::Withdrawn { pool_id, .. } => *pool_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PoolIssued { .. } => "pool_issued",
            Self::AssetAdded { .. } => "asset_added",
            Self::PoolInitialized { .. } => "pool_initialized",
            Self::OrderOpened { .. } => "order_opened",
            Self::OrderFilled { .. } => "order_filled",
            Self::OrderCancelled { .. } => "order_cancelled",
            Self::SharesTransferred { .. } => "shares_transferred",
            Self::CurveTraded { .. } => "curve_traded",
            Self::PoolTerminated { .. } => "pool_terminated",
            Self::PoolAborted { .. } => "pool_aborted",
            Self::Withdrawn { .. } => "withdrawn",
        }
    }
}
