//! Order book DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::SideDto;
use crate::domain::PoolId;
use crate::engine::{Fill, Order};

/// Request body for `POST /pools/{id}/orders/sell` and `/orders/buy`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    /// Account opening the order.
    pub caller: String,
    /// Payment-asset units per share (string-encoded u128).
    pub price: String,
    /// Share quantity (string-encoded u128).
    pub amount: String,
}

/// Request body for `POST /pools/{id}/orders/accept`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AcceptOrderRequest {
    /// Account filling the order.
    pub caller: String,
    /// Owner of the order being filled.
    pub counterparty: String,
    /// Shares to fill (string-encoded u128).
    pub amount: String,
}

/// An open order.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDto {
    /// Stable order index.
    pub index: usize,
    /// Order owner.
    pub account: String,
    /// Buy or sell.
    pub side: SideDto,
    /// Price per share.
    pub price: String,
    /// Unfilled share quantity.
    pub remaining_amount: String,
    /// Payment escrowed by the pool (buy orders).
    pub escrow: String,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            index: order.index,
            account: order.account.to_string(),
            side: order.side.into(),
            price: order.price.to_string(),
            remaining_amount: order.remaining_amount.to_string(),
            escrow: order.escrow.to_string(),
        }
    }
}

/// Response body for `GET /pools/{id}/orders`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderListResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Open orders by ascending index.
    pub orders: Vec<OrderDto>,
}

/// Response body for `POST /pools/{id}/orders/accept`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FillResponse {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// The filled order after the fill.
    pub order: OrderDto,
    /// Accepting account.
    pub taker: String,
    /// Shares exchanged.
    pub amount: String,
    /// Payment exchanged, tax excluded.
    pub value: String,
    /// Tax paid to the owner.
    pub tax: String,
    /// Whether the fill closed the order.
    pub closed: bool,
}

impl FillResponse {
    /// Builds the response from an engine [`Fill`].
    #[must_use]
    pub fn new(pool_id: PoolId, fill: &Fill) -> Self {
        Self {
            pool_id,
            order: OrderDto::from(&fill.order),
            taker: fill.taker.to_string(),
            amount: fill.amount.to_string(),
            value: fill.value.to_string(),
            tax: fill.tax.to_string(),
            closed: fill.closed_order(),
        }
    }
}
