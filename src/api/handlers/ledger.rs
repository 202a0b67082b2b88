//! Token ledger and factory handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{parse_account, parse_amount, parse_token};
use crate::api::dto::{
    BalanceResponse, FactoryFeeResponse, MintRequest, UpdateFactoryFeeRequest,
};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::FactoryFee;

/// `POST /ledger/mint` — Credit test tokens to an account.
///
/// # Errors
///
/// Returns [`GatewayError`] on a zero amount or balance overflow.
#[utoipa::path(
    post,
    path = "/api/v1/ledger/mint",
    tag = "Ledger",
    summary = "Mint tokens",
    description = "Faucet for the in-memory token ledger: credits freshly created tokens to an account.",
    request_body = MintRequest,
    responses(
        (status = 200, description = "Tokens minted; returns the new balance", body = BalanceResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 422, description = "Balance overflow", body = ErrorResponse),
    )
)]
pub async fn mint(
    State(state): State<AppState>,
    Json(req): Json<MintRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let token = parse_token("token", &req.token)?;
    let account = parse_account("account", &req.account)?;
    let amount = parse_amount("amount", &req.amount)?;

    let balance = state.pool_service.mint(&token, &account, amount).await?;
    Ok(Json(BalanceResponse {
        token: token.to_string(),
        account: account.to_string(),
        balance: balance.to_string(),
    }))
}

/// `GET /ledger/{token}/{account}` — Token balance.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on blank identifiers.
#[utoipa::path(
    get,
    path = "/api/v1/ledger/{token}/{account}",
    tag = "Ledger",
    summary = "Get token balance",
    params(
        ("token" = String, Path, description = "Token identifier"),
        ("account" = String, Path, description = "Account identifier"),
    ),
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
    )
)]
pub async fn balance(
    State(state): State<AppState>,
    Path((token, account)): Path<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let token = parse_token("token", &token)?;
    let account = parse_account("account", &account)?;
    let balance = state.pool_service.balance_of(&token, &account).await;
    Ok(Json(BalanceResponse {
        token: token.to_string(),
        account: account.to_string(),
        balance: balance.to_string(),
    }))
}

/// `GET /factory/fee` — Factory issue fee and beneficiary.
#[utoipa::path(
    get,
    path = "/api/v1/factory/fee",
    tag = "Ledger",
    summary = "Get factory fee",
    description = "Returns the issue fee, its token, and the beneficiary that receives it.",
    responses(
        (status = 200, description = "Factory fee", body = FactoryFeeResponse),
    )
)]
pub async fn factory_fee(State(state): State<AppState>) -> impl IntoResponse {
    Json(fee_response(state.pool_service.factory_fee().await))
}

/// `PUT /factory/fee` — Update the issue fee or its beneficiary.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a malformed fee or a blank
/// beneficiary, and `NotOwner` unless the caller owns the factory.
#[utoipa::path(
    put,
    path = "/api/v1/factory/fee",
    tag = "Ledger",
    summary = "Update factory fee",
    description = "Factory-owner setter for the issue fee and the beneficiary account. A zero fee is allowed.",
    request_body = UpdateFactoryFeeRequest,
    responses(
        (status = 200, description = "Updated factory fee", body = FactoryFeeResponse),
        (status = 400, description = "Invalid fee or beneficiary", body = ErrorResponse),
        (status = 403, description = "Caller is not the factory owner", body = ErrorResponse),
    )
)]
pub async fn update_factory_fee(
    State(state): State<AppState>,
    Json(req): Json<UpdateFactoryFeeRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let caller = parse_account("caller", &req.caller)?;
    let issue_fee = req
        .issue_fee
        .as_deref()
        .map(|raw| parse_amount("issue_fee", raw))
        .transpose()?;
    let beneficiary = req
        .beneficiary
        .as_deref()
        .map(|raw| parse_account("beneficiary", raw))
        .transpose()?;

    if let Some(issue_fee) = issue_fee {
        state.pool_service.set_issue_fee(&caller, issue_fee).await?;
    }
    if beneficiary.is_some() {
        state
            .pool_service
            .set_beneficiary(&caller, beneficiary)
            .await?;
    }
    Ok(Json(fee_response(state.pool_service.factory_fee().await)))
}

fn fee_response(fee: FactoryFee) -> FactoryFeeResponse {
    FactoryFeeResponse {
        owner: fee.owner.to_string(),
        issue_fee: fee.issue_fee.to_string(),
        fee_token: fee.fee_token.to_string(),
        beneficiary_pool_id: fee.beneficiary.as_ref().and_then(PoolId::from_account),
        beneficiary: fee.beneficiary.map(|account| account.to_string()),
    }
}

/// Ledger and factory routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/mint", post(mint))
        .route("/ledger/{token}/{account}", get(balance))
        .route("/factory/fee", get(factory_fee).put(update_factory_fee))
}
