//! REST endpoint handlers organized by resource.

pub mod curve;
pub mod ledger;
pub mod order;
pub mod pool;
pub mod shares;
pub mod system;

use axum::Router;

use crate::app_state::AppState;
use crate::engine::{AccountId, TokenId};
use crate::error::GatewayError;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pool::routes())
        .merge(order::routes())
        .merge(shares::routes())
        .merge(curve::routes())
        .merge(ledger::routes())
}

/// Parses a string-encoded u128 amount.
pub(crate) fn parse_amount(field: &str, value: &str) -> Result<u128, GatewayError> {
    value.trim().parse().map_err(|_| {
        GatewayError::InvalidRequest(format!(
            "{field} must be a non-negative integer string, got {value:?}"
        ))
    })
}

/// Parses an optional amount, defaulting to zero.
pub(crate) fn parse_optional_amount(
    field: &str,
    value: Option<&str>,
) -> Result<u128, GatewayError> {
    value.map_or(Ok(0), |value| parse_amount(field, value))
}

/// Validates a non-empty account identifier.
pub(crate) fn parse_account(field: &str, value: &str) -> Result<AccountId, GatewayError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GatewayError::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(AccountId::from(value))
}

/// Validates a non-empty token identifier.
pub(crate) fn parse_token(field: &str, value: &str) -> Result<TokenId, GatewayError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GatewayError::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(TokenId::from(value))
}
