//! Pool handlers: issuance, listing, detail, setup and wind-down.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{parse_account, parse_amount, parse_token};
use crate::api::dto::{
    AbortResponse, AddAssetRequest, AssetDto, AssetListResponse, CallerRequest, InitializeRequest,
    InitializeResponse, IssuePoolRequest, IssuePoolResponse, PaginationMeta, PaginationParams,
    PayoutDto, PoolDetailResponse, PoolFilter, PoolListResponse, PoolSummaryDto,
    TerminateResponse, WithdrawResponse,
};
use crate::app_state::AppState;
use crate::domain::PoolId;
use crate::engine::{InitParams, PoolState};
use crate::error::{ErrorResponse, GatewayError};

const MAX_NAME_LEN: usize = 100;

/// `POST /pools` — Issue a new share pool.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid input or an unpaid issue fee.
#[utoipa::path(
    post,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "Issue a new pool",
    description = "Issues a pool in the `created` state through the factory. The owner pays the factory issue fee when a beneficiary is configured.",
    request_body = IssuePoolRequest,
    responses(
        (status = 201, description = "Pool issued", body = IssuePoolResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Issue fee could not be paid", body = ErrorResponse),
    )
)]
pub async fn issue_pool(
    State(state): State<AppState>,
    Json(req): Json<IssuePoolRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let owner = parse_account("owner", &req.owner)?;
    let payment_asset = parse_token("payment_asset", &req.payment_asset)?;
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(GatewayError::InvalidRequest(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    let symbol = req.symbol.trim();
    if symbol.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "symbol must not be empty".to_string(),
        ));
    }

    let pool_id = state
        .pool_service
        .issue_pool(owner, payment_asset, name, symbol)
        .await?;
    let entry = state.pool_service.get_pool(pool_id).await?;

    Ok((StatusCode::CREATED, Json(IssuePoolResponse::from(&entry))))
}

/// `GET /pools` — List pools with pagination and optional state filter.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on an unknown state filter.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List pools",
    description = "Returns a paginated list of pools, oldest first, optionally filtered by lifecycle state.",
    params(PaginationParams, PoolFilter),
    responses(
        (status = 200, description = "Paginated pool list", body = PoolListResponse),
        (status = 400, description = "Unknown state filter", body = ErrorResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<PoolFilter>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let state_filter = filter.state.as_deref().map(parse_state).transpose()?;
    let summaries = state.pool_service.list_pools(state_filter).await;

    let total = u32::try_from(summaries.len()).unwrap_or(u32::MAX);
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    let start = usize::try_from(page.saturating_sub(1).saturating_mul(per_page))
        .unwrap_or(usize::MAX);
    let data: Vec<PoolSummaryDto> = summaries
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .map(PoolSummaryDto::from)
        .collect();

    Ok(Json(PoolListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /pools/{id}` — Get pool details.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Get pool details",
    description = "Returns the full state of one pool: lifecycle, tax, supply, assets, open order indices, bonding curve and trade metadata.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 200, description = "Pool details", body = PoolDetailResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let entry = state.pool_service.get_pool(PoolId::from_uuid(id)).await?;
    Ok(Json(PoolDetailResponse::from(&entry)))
}

/// `POST /pools/{id}/assets` — Deposit an asset.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller is not the owner, the pool is not
/// `created`, or the deposit cannot be funded.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/assets",
    tag = "Pools",
    summary = "Add an asset",
    description = "Moves tokens from the owner into the pool. Only while the pool is `created`; the payment asset cannot be pooled.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = AddAssetRequest,
    responses(
        (status = 200, description = "Asset deposited", body = AssetDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
        (status = 422, description = "Insufficient balance", body = ErrorResponse),
    )
)]
pub async fn add_asset(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AddAssetRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let caller = parse_account("caller", &req.caller)?;
    let token = parse_token("token", &req.token)?;
    let amount = parse_amount("amount", &req.amount)?;

    let asset = state
        .pool_service
        .add_asset(PoolId::from_uuid(id), &caller, &token, amount)
        .await?;
    Ok(Json(AssetDto::from(&asset)))
}

/// `GET /pools/{id}/assets` — List pooled assets.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/assets",
    tag = "Pools",
    summary = "List pooled assets",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    responses(
        (status = 200, description = "Pooled assets", body = AssetListResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn list_assets(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let assets = state.pool_service.assets(pool_id).await?;
    Ok(Json(AssetListResponse {
        pool_id,
        assets: assets.iter().map(AssetDto::from).collect(),
    }))
}

/// `POST /pools/{id}/initialize` — Fix supply, tax and precision.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid parameters, a non-owner caller or a
/// pool that is not `created`.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/initialize",
    tag = "Lifecycle",
    summary = "Initialize a pool",
    description = "Fixes the tax rate (per mille), the share precision and the total supply of 100 × 10^precision shares, then opens trading. With `bonding_reserve` the supply is issued through a bonding curve instead of credited to the owner.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = InitializeRequest,
    responses(
        (status = 200, description = "Pool initialized", body = InitializeResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
    )
)]
pub async fn initialize(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<InitializeRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let caller = parse_account("caller", &req.caller)?;
    let bonding_reserve = req
        .bonding_reserve
        .as_deref()
        .map(|value| parse_amount("bonding_reserve", value))
        .transpose()?;
    let params = InitParams {
        tax_rate: req.tax_rate,
        share_precision: req.share_precision,
        bonding_reserve,
    };

    let total_supply = state
        .pool_service
        .initialize(pool_id, &caller, params)
        .await?;
    Ok(Json(InitializeResponse {
        pool_id,
        state: PoolState::Initialized.to_string(),
        total_share_supply: total_supply.to_string(),
    }))
}

/// `POST /pools/{id}/abort` — Refund deposits of an uninitialized pool.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller is not the owner or the pool is
/// not `created`.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/abort",
    tag = "Lifecycle",
    summary = "Abort a pool",
    description = "Returns every deposited asset to the owner and moves the pool straight to `terminated`. Only before initialization.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Pool aborted", body = AbortResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
    )
)]
pub async fn abort(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CallerRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let caller = parse_account("caller", &req.caller)?;
    let refunds = state.pool_service.abort(pool_id, &caller).await?;
    Ok(Json(AbortResponse {
        pool_id,
        state: PoolState::Terminated.to_string(),
        refunds: refunds.iter().map(PayoutDto::from).collect(),
    }))
}

/// `POST /pools/{id}/terminate` — End trading and fix settlement amounts.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller is not the owner or the pool is
/// not `initialized`.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/terminate",
    tag = "Lifecycle",
    summary = "Terminate a pool",
    description = "Snapshots every asset amount as its settlement amount and closes the bonding curve, if any. Open orders stay cancellable.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Pool terminated", body = TerminateResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
    )
)]
pub async fn terminate(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CallerRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let caller = parse_account("caller", &req.caller)?;
    let termination = state.pool_service.terminate(pool_id, &caller).await?;
    Ok(Json(TerminateResponse::new(pool_id, &termination)))
}

/// `POST /pools/{id}/withdraw` — Claim the pro-rata asset slice.
///
/// # Errors
///
/// Returns [`GatewayError`] if the pool is not `terminated` or the caller
/// holds no shares.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/withdraw",
    tag = "Lifecycle",
    summary = "Withdraw assets",
    description = "Pays the caller floor(settlement × shares / supply) of every asset and burns their shares.",
    params(
        ("id" = uuid::Uuid, Path, description = "Pool UUID"),
    ),
    request_body = CallerRequest,
    responses(
        (status = 200, description = "Assets withdrawn", body = WithdrawResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Not available in current state", body = ErrorResponse),
        (status = 422, description = "No shares available", body = ErrorResponse),
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CallerRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool_id = PoolId::from_uuid(id);
    let caller = parse_account("caller", &req.caller)?;
    let withdrawal = state.pool_service.withdraw(pool_id, &caller).await?;
    Ok(Json(WithdrawResponse::new(pool_id, &withdrawal)))
}

/// Pool routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", post(issue_pool).get(list_pools))
        .route("/pools/{id}", get(get_pool))
        .route("/pools/{id}/assets", post(add_asset).get(list_assets))
        .route("/pools/{id}/initialize", post(initialize))
        .route("/pools/{id}/abort", post(abort))
        .route("/pools/{id}/terminate", post(terminate))
        .route("/pools/{id}/withdraw", post(withdraw))
}

fn parse_state(value: &str) -> Result<PoolState, GatewayError> {
    match value {
        "created" => Ok(PoolState::Created),
        "initialized" => Ok(PoolState::Initialized),
        "terminated" => Ok(PoolState::Terminated),
        other => Err(GatewayError::InvalidRequest(format!(
            "unknown pool state {other:?}"
        ))),
    }
}
