//! Share handlers: transfers and balances.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{parse_account, parse_amount};
use crate::api::dto::{ShareBalanceResponse, TransferSharesRequest, TransferSharesResponse};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /pools/{id}/shares/transfer` — Move shares between accounts.
///
/// # Errors
///
/// Returns [`GatewayError`] on a zero amount, insufficient shares or a pool
/// that has not been initialized.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/shares/transfer",
    tag = "Shares",
    summary = "Transfer shares",
    description = "Moves visible shares from the caller to another account. Shares locked in sell orders cannot be transferred.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = TransferSharesRequest,
    responses(
        (status = 200, description = "Shares transferred", body = TransferSharesResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
        (status = 422, description = "Insufficient shares", body = ErrorResponse),
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<TransferSharesRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let caller = parse_account("caller", &req.caller)?;
    let to = parse_account("to", &req.to)?;
    let amount = parse_amount("amount", &req.amount)?;

    state
        .pool_service
        .transfer(pool_id, &caller, &to, amount)
        .await?;
    Ok(Json(TransferSharesResponse {
        pool_id,
        from: caller.to_string(),
        to: to.to_string(),
        amount: amount.to_string(),
    }))
}

/// `GET /pools/{id}/shares/{account}` — Visible share balance.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/shares/{account}",
    tag = "Shares",
    summary = "Get share balance",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
        ("account" = String, Path, description = "Account identifier"),
    ),
    responses(
        (status = 200, description = "Share balance", body = ShareBalanceResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn share_balance(
    State(state): State<AppState>,
    Path((id, account)): Path<(uuid::Uuid, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let account = parse_account("account", &account)?;
    let balance = state.pool_service.share_balance(pool_id, &account).await?;
    Ok(Json(ShareBalanceResponse {
        pool_id,
        account: account.to_string(),
        balance: balance.to_string(),
    }))
}

/// Share routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools/{id}/shares/transfer", post(transfer))
        .route("/pools/{id}/shares/{account}", get(share_balance))
}
