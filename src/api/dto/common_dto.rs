//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::engine::{OrderSide, Payout};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }
}

/// Request body carrying only the calling account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CallerRequest {
    /// Account performing the operation.
    pub caller: String,
}

/// A token amount paid out of a pool.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayoutDto {
    /// Token identifier.
    pub token: String,
    /// Amount (string-encoded u128).
    pub amount: String,
}

impl From<&Payout> for PayoutDto {
    fn from(payout: &Payout) -> Self {
        Self {
            token: payout.token.to_string(),
            amount: payout.amount.to_string(),
        }
    }
}

/// Trade direction as exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SideDto {
    /// Buy side.
    Buy,
    /// Sell side.
    Sell,
}

impl From<OrderSide> for SideDto {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Self::Buy,
            OrderSide::Sell => Self::Sell,
        }
    }
}
