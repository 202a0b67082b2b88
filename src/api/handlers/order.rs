//! Order book handlers: sell, buy, accept, cancel and order queries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{parse_account, parse_amount};
use crate::api::dto::{
    AcceptOrderRequest, CallerRequest, FillResponse, OrderDto, OrderListResponse,
    PlaceOrderRequest,
};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /pools/{id}/orders/sell` — Open a sell order.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid amounts, an existing order,
/// insufficient shares or a pool that is not `initialized`.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/orders/sell",
    tag = "Orders",
    summary = "Open a sell order",
    description = "Locks `amount` of the caller's shares in a sell order at `price`. An account may hold one open order at a time.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order opened", body = OrderDto),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Active order or wrong state", body = ErrorResponse),
        (status = 422, description = "Insufficient shares", body = ErrorResponse),
    )
)]
pub async fn sell(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let caller = parse_account("caller", &req.caller)?;
    let price = parse_amount("price", &req.price)?;
    let amount = parse_amount("amount", &req.amount)?;

    let order = state
        .pool_service
        .sell(PoolId::from_uuid(id), &caller, price, amount)
        .await?;
    Ok((StatusCode::CREATED, Json(OrderDto::from(&order))))
}

/// `POST /pools/{id}/orders/buy` — Open a buy order.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid amounts, an existing order, an
/// unfunded escrow or a pool that is not `initialized`.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/orders/buy",
    tag = "Orders",
    summary = "Open a buy order",
    description = "Escrows price × amount plus tax of the payment asset in a buy order.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order opened", body = OrderDto),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Active order or wrong state", body = ErrorResponse),
        (status = 422, description = "Insufficient balance", body = ErrorResponse),
    )
)]
pub async fn buy(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let caller = parse_account("caller", &req.caller)?;
    let price = parse_amount("price", &req.price)?;
    let amount = parse_amount("amount", &req.amount)?;

    let order = state
        .pool_service
        .buy(PoolId::from_uuid(id), &caller, price, amount)
        .await?;
    Ok((StatusCode::CREATED, Json(OrderDto::from(&order))))
}

/// `POST /pools/{id}/orders/accept` — Fill another account's order.
///
/// # Errors
///
/// Returns [`GatewayError`] if the counterparty has no order, the amount
/// exceeds what remains, or either side cannot pay.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/orders/accept",
    tag = "Orders",
    summary = "Accept an order",
    description = "Fills part or all of the counterparty's open order. The tax on the fill value goes to the pool owner.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = AcceptOrderRequest,
    responses(
        (status = 200, description = "Order filled", body = FillResponse),
        (status = 400, description = "Invalid amount or self trade", body = ErrorResponse),
        (status = 404, description = "Pool or order not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
        (status = 422, description = "Insufficient shares, amount or balance", body = ErrorResponse),
    )
)]
pub async fn accept(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AcceptOrderRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let caller = parse_account("caller", &req.caller)?;
    let counterparty = parse_account("counterparty", &req.counterparty)?;
    let amount = parse_amount("amount", &req.amount)?;

    let fill = state
        .pool_service
        .accept(pool_id, &caller, &counterparty, amount)
        .await?;
    Ok(Json(FillResponse::new(pool_id, &fill)))
}

/// `POST /pools/{id}/orders/cancel` — Cancel the caller's order.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller has no open order.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/orders/cancel",
    tag = "Orders",
    summary = "Cancel an order",
    description = "Closes the caller's open order, returning locked shares or refunding the escrow. Also available after termination.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Order cancelled", body = OrderDto),
        (status = 404, description = "Pool or order not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CallerRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let caller = parse_account("caller", &req.caller)?;
    let order = state
        .pool_service
        .cancel(PoolId::from_uuid(id), &caller)
        .await?;
    Ok(Json(OrderDto::from(&order)))
}

/// `GET /pools/{id}/orders` — List open orders.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/orders",
    tag = "Orders",
    summary = "List open orders",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 200, description = "Open orders by ascending index", body = OrderListResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let orders = state.pool_service.orders(pool_id).await?;
    Ok(Json(OrderListResponse {
        pool_id,
        orders: orders.iter().map(OrderDto::from).collect(),
    }))
}

/// `GET /pools/{id}/orders/{index}` — Get one open order.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool or the order does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/orders/{index}",
    tag = "Orders",
    summary = "Get an order",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("index" = usize, Path, description = "Order index"),
    ),
    responses(
        (status = 200, description = "Order details", body = OrderDto),
        (status = 404, description = "Pool or order not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path((id, index)): Path<(uuid::Uuid, usize)>,
) -> Result<impl IntoResponse, GatewayError> {
    let order = state
        .pool_service
        .order(PoolId::from_uuid(id), index)
        .await?;
    Ok(Json(OrderDto::from(&order)))
}

/// Order book routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/orders", get(list_orders))
        .route("/pools/{id}/orders/sell", post(sell))
        .route("/pools/{id}/orders/buy", post(buy))
        .route("/pools/{id}/orders/accept", post(accept))
        .route("/pools/{id}/orders/cancel", post(cancel))
        .route("/pools/{id}/orders/{index}", get(get_order))
}
