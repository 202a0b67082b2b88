//! Share transfer, balance and bonding-curve DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::SideDto;
use crate::domain::PoolId;
use crate::engine::CurveTrade;

/// Request body for `POST /pools/{id}/shares/transfer`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferSharesRequest {
    /// Sending account.
    pub caller: String,
    /// Receiving account.
    pub to: String,
    /// Shares to move (string-encoded u128).
    pub amount: String,
}

/// Response body for `POST /pools/{id}/shares/transfer`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferSharesResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Sending account.
    pub from: String,
    /// Receiving account.
    pub to: String,
    /// Shares moved.
    pub amount: String,
}

/// Response body for `GET /pools/{id}/shares/{account}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShareBalanceResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Queried account.
    pub account: String,
    /// Visible share balance (string-encoded u128).
    pub balance: String,
}

/// Request body for `POST /pools/{id}/curve/purchase`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// Buying account.
    pub caller: String,
    /// Payment spent, tax excluded (string-encoded u128).
    pub payment_in: String,
    /// Minimum shares accepted (string-encoded u128). Defaults to 0.
    #[serde(default)]
    pub min_shares_out: Option<String>,
}

/// Request body for `POST /pools/{id}/curve/redeem`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemRequest {
    /// Redeeming account.
    pub caller: String,
    /// Shares sold back (string-encoded u128).
    pub shares_in: String,
    /// Minimum payment accepted (string-encoded u128). Defaults to 0.
    #[serde(default)]
    pub min_payment_out: Option<String>,
}

/// Response body for curve purchases and redemptions.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurveTradeResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Trading account.
    pub account: String,
    /// `buy` for purchases, `sell` for redemptions.
    pub side: SideDto,
    /// Shares issued or redeemed.
    pub shares: String,
    /// Payment in or out, tax excluded.
    pub payment: String,
    /// Tax paid to the owner.
    pub tax: String,
    /// Share reserve after the trade.
    pub reserve_shares: String,
    /// Payment reserve after the trade.
    pub reserve_payment: String,
}

impl CurveTradeResponse {
    /// Builds the response from an engine [`CurveTrade`].
    #[must_use]
    pub fn new(pool_id: PoolId, trade: &CurveTrade) -> Self {
        Self {
            pool_id,
            account: trade.account.to_string(),
            side: trade.side.into(),
            shares: trade.shares.to_string(),
            payment: trade.payment.to_string(),
            tax: trade.tax.to_string(),
            reserve_shares: trade.reserve_shares.to_string(),
            reserve_payment: trade.reserve_payment.to_string(),
        }
    }
}

/// Request body for `POST /pools/{id}/curve/quote`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CurveQuoteRequest {
    /// `buy` quotes a purchase, `sell` a redemption.
    pub side: SideDto,
    /// Payment in (buy) or shares in (sell), string-encoded u128.
    pub amount: String,
}

/// Response body for `POST /pools/{id}/curve/quote`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurveQuoteResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Quoted side.
    pub side: SideDto,
    /// Input amount.
    pub amount_in: String,
    /// Shares (buy) or payment (sell) the trade would yield.
    pub amount_out: String,
}
