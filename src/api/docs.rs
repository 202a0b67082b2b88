//! OpenAPI document for the REST API.

use utoipa::OpenApi;

use crate::api::dto;
use crate::api::handlers::{curve, ledger, order, pool, shares, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Aggregated OpenAPI specification, served by Swagger UI at `/docs`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "stakepool-gateway",
        description = "REST and WebSocket gateway for share pools: issue a pool, pool assets, trade shares through an order book or a bonding curve, then wind down and withdraw pro rata."
    ),
    paths(
        pool::issue_pool,
        pool::list_pools,
        pool::get_pool,
        pool::add_asset,
        pool::list_assets,
        pool::initialize,
        pool::abort,
        pool::terminate,
        pool::withdraw,
        order::sell,
        order::buy,
        order::accept,
        order::cancel,
        order::list_orders,
        order::get_order,
        shares::transfer,
        shares::share_balance,
        curve::purchase,
        curve::redeem,
        curve::quote,
        ledger::mint,
        ledger::balance,
        ledger::factory_fee,
        ledger::update_factory_fee,
        system::health_handler,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        dto::PaginationMeta,
        dto::CallerRequest,
        dto::PayoutDto,
        dto::SideDto,
        dto::IssuePoolRequest,
        dto::IssuePoolResponse,
        dto::PoolSummaryDto,
        dto::PoolListResponse,
        dto::PoolDetailResponse,
        dto::AssetDto,
        dto::CurveDto,
        dto::AddAssetRequest,
        dto::AssetListResponse,
        dto::InitializeRequest,
        dto::InitializeResponse,
        dto::AbortResponse,
        dto::TerminateResponse,
        dto::WithdrawResponse,
        dto::PlaceOrderRequest,
        dto::AcceptOrderRequest,
        dto::OrderDto,
        dto::OrderListResponse,
        dto::FillResponse,
        dto::TransferSharesRequest,
        dto::TransferSharesResponse,
        dto::ShareBalanceResponse,
        dto::PurchaseRequest,
        dto::RedeemRequest,
        dto::CurveTradeResponse,
        dto::CurveQuoteRequest,
        dto::CurveQuoteResponse,
        dto::MintRequest,
        dto::BalanceResponse,
        dto::FactoryFeeResponse,
        dto::UpdateFactoryFeeRequest,
        system::HealthResponse,
    )),
    tags(
        (name = "Pools", description = "Pool issuance, listing and assets"),
        (name = "Lifecycle", description = "Initialize, abort, terminate and withdraw"),
        (name = "Orders", description = "One-order-per-account order book"),
        (name = "Shares", description = "Share transfers and balances"),
        (name = "Curve", description = "Bonding-curve issuance"),
        (name = "Ledger", description = "In-memory token ledger and factory fee"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/pools",
            "/api/v1/pools/{id}/orders/accept",
            "/api/v1/pools/{id}/curve/quote",
            "/api/v1/factory/fee",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
