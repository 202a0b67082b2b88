//! Bonding-curve handlers: purchase, redeem and quotes.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use super::{parse_account, parse_amount, parse_optional_amount};
use crate::api::dto::{
    CurveQuoteRequest, CurveQuoteResponse, CurveTradeResponse, PurchaseRequest, RedeemRequest,
    SideDto,
};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /pools/{id}/curve/purchase` — Buy shares from the curve.
///
/// # Errors
///
/// Returns [`GatewayError`] without a bonding curve, on slippage, for the
/// owner, or if the caller cannot pay.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/curve/purchase",
    tag = "Curve",
    summary = "Purchase shares",
    description = "Buys shares from the bonding reserve for `payment_in`; tax on top goes to the owner. Fails if fewer than `min_shares_out` would be issued.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Shares purchased", body = CurveTradeResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 403, description = "Owner cannot trade with the curve", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
        (status = 422, description = "Slippage, disabled curve or insufficient balance", body = ErrorResponse),
    )
)]
pub async fn purchase(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let caller = parse_account("caller", &req.caller)?;
    let payment_in = parse_amount("payment_in", &req.payment_in)?;
    let min_shares_out = parse_optional_amount("min_shares_out", req.min_shares_out.as_deref())?;

    let trade = state
        .pool_service
        .purchase(pool_id, &caller, payment_in, min_shares_out)
        .await?;
    Ok(Json(CurveTradeResponse::new(pool_id, &trade)))
}

/// `POST /pools/{id}/curve/redeem` — Sell shares back to the curve.
///
/// # Errors
///
/// Returns [`GatewayError`] without a bonding curve, on slippage, for the
/// owner, or if the curve cannot cover the payout.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/curve/redeem",
    tag = "Curve",
    summary = "Redeem shares",
    description = "Sells shares back to the bonding reserve. Payouts come only from payment the curve actually received.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Shares redeemed", body = CurveTradeResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 403, description = "Owner cannot trade with the curve", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
        (status = 422, description = "Slippage, disabled curve or insufficient liquidity", body = ErrorResponse),
    )
)]
pub async fn redeem(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RedeemRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let caller = parse_account("caller", &req.caller)?;
    let shares_in = parse_amount("shares_in", &req.shares_in)?;
    let min_payment_out =
        parse_optional_amount("min_payment_out", req.min_payment_out.as_deref())?;

    let trade = state
        .pool_service
        .redeem(pool_id, &caller, shares_in, min_payment_out)
        .await?;
    Ok(Json(CurveTradeResponse::new(pool_id, &trade)))
}

/// `POST /pools/{id}/curve/quote` — Quote a curve trade (read-only).
///
/// # Errors
///
/// Returns [`GatewayError`] without an open bonding curve.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/curve/quote",
    tag = "Curve",
    summary = "Quote a curve trade",
    description = "Returns what a purchase (`buy`) or redemption (`sell`) would yield at the current reserves. The pool is not modified.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = CurveQuoteRequest,
    responses(
        (status = 200, description = "Quote", body = CurveQuoteResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 422, description = "Curve disabled", body = ErrorResponse),
    )
)]
pub async fn quote(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CurveQuoteRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let amount = parse_amount("amount", &req.amount)?;

    let amount_out = match req.side {
        SideDto::Buy => state.pool_service.quote_purchase(pool_id, amount).await?,
        SideDto::Sell => state.pool_service.quote_redeem(pool_id, amount).await?,
    };
    Ok(Json(CurveQuoteResponse {
        pool_id,
        side: req.side,
        amount_in: amount.to_string(),
        amount_out: amount_out.to_string(),
    }))
}

/// Bonding-curve routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/curve/purchase", post(purchase))
        .route("/pools/{id}/curve/redeem", post(redeem))
        .route("/pools/{id}/curve/quote", post(quote))
}
