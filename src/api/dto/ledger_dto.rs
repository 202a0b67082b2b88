//! Token ledger and factory DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PoolId;

/// Request body for `POST /ledger/mint`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MintRequest {
    /// Token to mint.
    pub token: String,
    /// Receiving account.
    pub account: String,
    /// Amount (string-encoded u128).
    pub amount: String,
}

/// Token balance of one account.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Token identifier.
    pub token: String,
    /// Account identifier.
    pub account: String,
    /// Balance (string-encoded u128).
    pub balance: String,
}

/// Response body for `GET /factory/fee`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FactoryFeeResponse {
    /// Account allowed to change the fee settings.
    pub owner: String,
    /// Fee charged per issued pool (string-encoded u128).
    pub issue_fee: String,
    /// Token the fee is paid in.
    pub fee_token: String,
    /// Account receiving the fee; no fee is charged while unset.
    pub beneficiary: Option<String>,
    /// Pool behind the beneficiary account, when it is a pool.
    pub beneficiary_pool_id: Option<PoolId>,
}

/// Request body for `PUT /factory/fee`. Omitted fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFactoryFeeRequest {
    /// Factory owner.
    pub caller: String,
    /// New issue fee (string-encoded u128).
    #[serde(default)]
    pub issue_fee: Option<String>,
    /// New beneficiary account.
    #[serde(default)]
    pub beneficiary: Option<String>,
}
