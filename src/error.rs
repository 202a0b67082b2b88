//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! (and each wrapped engine [`PoolError`]) maps to a numeric code, an HTTP
//! status and a structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::{LedgerError, PoolError};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "message": "sell is not available in current state (created)",
///     "details": "state=created"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000-1099 | Validation      | 400 Bad Request              |
/// | 1100-1199 | Authorization   | 403 Forbidden                |
/// | 2000-2099 | Not Found       | 404 Not Found                |
/// | 2100-2199 | State           | 409 Conflict                 |
/// | 3000-3999 | Server          | 500 Internal Server Error    |
/// | 4000-4999 | Pool resources  | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Pool with the given ID was not found.
    #[error("pool not found: {0}")]
    PoolNotFound(uuid::Uuid),

    /// Request validation failed before reaching the engine.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The engine rejected the operation.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LedgerError> for GatewayError {
    fn from(err: LedgerError) -> Self {
        Self::Pool(PoolError::Ledger(err))
    }
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::PoolNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Pool(err) => match err {
                PoolError::InvalidAmount(_) => 1002,
                PoolError::InvalidTaxRate(_) => 1003,
                PoolError::InvalidPrecision(_) => 1004,
                PoolError::PaymentAssetNotAllowed => 1005,
                PoolError::SelfTrade => 1006,
                PoolError::NotOwner => 1101,
                PoolError::OwnerNotAllowed => 1102,
                PoolError::OrderNotFound(_) => 2002,
                PoolError::NoActiveOrder(_) => 2003,
                PoolError::InvalidState { .. } => 2101,
                PoolError::ActiveOrder => 2102,
                PoolError::InsufficientShares { .. } => 4001,
                PoolError::InsufficientAmount { .. } => 4002,
                PoolError::NoSharesAvailable => 4003,
                PoolError::SlippageExceeded { .. } => 4004,
                PoolError::CurveDisabled => 4005,
                PoolError::InsufficientLiquidity => 4006,
                PoolError::Ledger(LedgerError::InsufficientBalance { .. }) => 4007,
                PoolError::Ledger(LedgerError::Overflow { .. }) => 4008,
                PoolError::Overflow => 4009,
            },
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.error_code() {
            1000..=1099 => StatusCode::BAD_REQUEST,
            1100..=1199 => StatusCode::FORBIDDEN,
            2000..=2099 => StatusCode::NOT_FOUND,
            2100..=2199 => StatusCode::CONFLICT,
            4000..=4999 => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Extra machine-readable context, if any.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Pool(PoolError::InvalidState { operation, state }) => {
                Some(format!("operation={operation} state={state}"))
            }
            Self::Pool(PoolError::Ledger(
                LedgerError::InsufficientBalance { token, account, .. }
                | LedgerError::Overflow { token, account },
            )) => Some(format!("token={token} account={account}")),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, axum::Json(body)).into_response()
    }
}
