//! Pool-related DTOs: issuance, listing, detail, setup and wind-down.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PayoutDto};
use crate::domain::pool_entry::{PoolEntry, PoolSummary};
use crate::domain::PoolId;
use crate::engine::{Asset, BondingCurve, Termination, Withdrawal};

/// Request body for `POST /pools`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssuePoolRequest {
    /// Owning account; pays the factory issue fee.
    pub owner: String,
    /// Token share trades settle in.
    pub payment_asset: String,
    /// Display name (max 100 chars).
    pub name: String,
    /// Share symbol; stored with a `"% "` prefix.
    pub symbol: String,
}

/// Response body for `POST /pools` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct IssuePoolResponse {
    /// Unique pool identifier.
    pub pool_id: PoolId,
    /// Ledger account holding the pool's tokens.
    pub address: String,
    /// Owning account.
    pub owner: String,
    /// Display name.
    pub name: String,
    /// Share symbol.
    pub symbol: String,
    /// Lifecycle state (`created`).
    pub state: String,
    /// Issuance timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&PoolEntry> for IssuePoolResponse {
    fn from(entry: &PoolEntry) -> Self {
        Self {
            pool_id: entry.pool_id,
            address: entry.pool.address().to_string(),
            owner: entry.pool.owner().to_string(),
            name: entry.pool.name().to_string(),
            symbol: entry.pool.symbol().to_string(),
            state: entry.pool.state().to_string(),
            created_at: entry.created_at,
        }
    }
}

/// Optional state filter for `GET /pools`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PoolFilter {
    /// `created`, `initialized` or `terminated`.
    #[serde(default)]
    pub state: Option<String>,
}

/// Compact pool representation for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolSummaryDto {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Display name.
    pub name: String,
    /// Share symbol.
    pub symbol: String,
    /// Owning account.
    pub owner: String,
    /// Settlement token.
    pub payment_asset: String,
    /// Lifecycle state.
    pub state: String,
    /// Issuance timestamp.
    pub created_at: DateTime<Utc>,
    /// Trades executed.
    pub trade_count: u64,
}

impl From<PoolSummary> for PoolSummaryDto {
    fn from(summary: PoolSummary) -> Self {
        Self {
            pool_id: summary.pool_id,
            name: summary.name,
            symbol: summary.symbol,
            owner: summary.owner.to_string(),
            payment_asset: summary.payment_asset.to_string(),
            state: summary.state.to_string(),
            created_at: summary.created_at,
            trade_count: summary.trade_count,
        }
    }
}

/// Response body for `GET /pools`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Pool summaries for the current page.
    pub data: Vec<PoolSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// A pooled asset.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetDto {
    /// Token identifier.
    pub token: String,
    /// Amount currently held (string-encoded u128).
    pub amount: String,
    /// Amount fixed at termination (string-encoded u128).
    pub settlement_amount: String,
}

impl From<&Asset> for AssetDto {
    fn from(asset: &Asset) -> Self {
        Self {
            token: asset.token.to_string(),
            amount: asset.amount.to_string(),
            settlement_amount: asset.settlement_amount.to_string(),
        }
    }
}

/// Bonding-curve reserves.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurveDto {
    /// Shares still held by the curve.
    pub reserve_shares: String,
    /// Pricing payment reserve, virtual part included.
    pub reserve_payment: String,
    /// Payment actually received by the curve.
    pub proceeds: String,
    /// Whether the curve closed at termination.
    pub closed: bool,
}

impl From<&BondingCurve> for CurveDto {
    fn from(curve: &BondingCurve) -> Self {
        Self {
            reserve_shares: curve.reserve_shares().to_string(),
            reserve_payment: curve.reserve_payment().to_string(),
            proceeds: curve.proceeds().to_string(),
            closed: curve.is_closed(),
        }
    }
}

/// Response body for `GET /pools/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolDetailResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Ledger account holding the pool's tokens.
    pub address: String,
    /// Owning account.
    pub owner: String,
    /// Settlement token.
    pub payment_asset: String,
    /// Display name.
    pub name: String,
    /// Share symbol.
    pub symbol: String,
    /// Lifecycle state.
    pub state: String,
    /// Trade tax in tenths of a percent.
    pub tax_rate: u32,
    /// Share precision.
    pub share_precision: u32,
    /// Total share supply (string-encoded u128).
    pub total_share_supply: String,
    /// Pooled assets.
    pub assets: Vec<AssetDto>,
    /// Indices of open orders, ascending.
    pub orders: Vec<usize>,
    /// Bonding curve, when enabled.
    pub curve: Option<CurveDto>,
    /// Issuance timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Trades executed.
    pub trade_count: u64,
    /// Cumulative traded value, tax excluded.
    pub trade_volume: String,
}

impl From<&PoolEntry> for PoolDetailResponse {
    fn from(entry: &PoolEntry) -> Self {
        let pool = &entry.pool;
        Self {
            pool_id: entry.pool_id,
            address: pool.address().to_string(),
            owner: pool.owner().to_string(),
            payment_asset: pool.payment_asset().to_string(),
            name: pool.name().to_string(),
            symbol: pool.symbol().to_string(),
            state: pool.state().to_string(),
            tax_rate: pool.tax_rate().per_mille(),
            share_precision: pool.share_precision(),
            total_share_supply: pool.total_share_supply().to_string(),
            assets: pool.assets().iter().map(AssetDto::from).collect(),
            orders: pool.orders(),
            curve: pool.curve().map(CurveDto::from),
            created_at: entry.created_at,
            updated_at: entry.last_modified_at,
            trade_count: entry.trade_count,
            trade_volume: entry.trade_volume.to_string(),
        }
    }
}

/// Request body for `POST /pools/{id}/assets`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddAssetRequest {
    /// Pool owner.
    pub caller: String,
    /// Token to deposit.
    pub token: String,
    /// Amount (string-encoded u128).
    pub amount: String,
}

/// Response body for `GET /pools/{id}/assets`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetListResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Pooled assets in deposit order.
    pub assets: Vec<AssetDto>,
}

/// Request body for `POST /pools/{id}/initialize`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InitializeRequest {
    /// Pool owner.
    pub caller: String,
    /// Trade tax in tenths of a percent (0..=1000).
    #[serde(default)]
    pub tax_rate: u32,
    /// Decimal exponent applied to the 100 whole shares (0..=18).
    #[serde(default)]
    pub share_precision: u32,
    /// Virtual payment reserve; enables bonding-curve issuance.
    #[serde(default)]
    pub bonding_reserve: Option<String>,
}

/// Response body for `POST /pools/{id}/initialize`.
#[derive(Debug, Serialize, ToSchema)]
pub struct InitializeResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Lifecycle state (`initialized`).
    pub state: String,
    /// Total share supply (string-encoded u128).
    pub total_share_supply: String,
}

/// Response body for `POST /pools/{id}/abort`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AbortResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Lifecycle state (`terminated`).
    pub state: String,
    /// Deposits returned to the owner.
    pub refunds: Vec<PayoutDto>,
}

/// Response body for `POST /pools/{id}/terminate`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TerminateResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Lifecycle state (`terminated`).
    pub state: String,
    /// Per-asset settlement amounts.
    pub settlement: Vec<PayoutDto>,
    /// Unsold curve shares credited to the owner.
    pub curve_shares: String,
    /// Curve proceeds paid to the owner.
    pub curve_proceeds: String,
}

impl TerminateResponse {
    /// Builds the response from an engine [`Termination`].
    #[must_use]
    pub fn new(pool_id: PoolId, termination: &Termination) -> Self {
        Self {
            pool_id,
            state: "terminated".to_string(),
            settlement: termination.settlement.iter().map(PayoutDto::from).collect(),
            curve_shares: termination.curve_shares.to_string(),
            curve_proceeds: termination.curve_proceeds.to_string(),
        }
    }
}

/// Response body for `POST /pools/{id}/withdraw`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WithdrawResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Withdrawing account.
    pub account: String,
    /// Shares burned.
    pub shares: String,
    /// Asset slices paid.
    pub payouts: Vec<PayoutDto>,
}

impl WithdrawResponse {
    /// Builds the response from an engine [`Withdrawal`].
    #[must_use]
    pub fn new(pool_id: PoolId, withdrawal: &Withdrawal) -> Self {
        Self {
            pool_id,
            account: withdrawal.account.to_string(),
            shares: withdrawal.shares.to_string(),
            payouts: withdrawal.payouts.iter().map(PayoutDto::from).collect(),
        }
    }
}
