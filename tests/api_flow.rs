//! End-to-end REST tests: the full router served over TCP and driven with
//! `reqwest`.

#![allow(clippy::panic, clippy::indexing_slicing)]

use serde_json::{Value, json};
use tokio_test::assert_ok;

use stakepool_gateway::app::build_app;
use stakepool_gateway::app_state::AppState;
use stakepool_gateway::config::GatewayConfig;

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(GatewayConfig::default()).await
    }

    async fn start_with(config: GatewayConfig) -> Self {
        let state = AppState::from_config(&config);
        let app = build_app(state, &config);
        let listener = assert_ok!(tokio::net::TcpListener::bind("127.0.0.1:0").await);
        let addr = assert_ok!(listener.local_addr());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = assert_ok!(
            self.client
                .post(format!("{}/api/v1{path}", self.base))
                .json(&body)
                .send()
                .await
        );
        let status = resp.status().as_u16();
        (status, assert_ok!(resp.json::<Value>().await))
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = assert_ok!(
            self.client
                .put(format!("{}/api/v1{path}", self.base))
                .json(&body)
                .send()
                .await
        );
        let status = resp.status().as_u16();
        (status, assert_ok!(resp.json::<Value>().await))
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = assert_ok!(
            self.client
                .get(format!("{}/api/v1{path}", self.base))
                .send()
                .await
        );
        let status = resp.status().as_u16();
        (status, assert_ok!(resp.json::<Value>().await))
    }

    async fn mint(&self, token: &str, account: &str, amount: u128) {
        let (status, _) = self
            .post(
                "/ledger/mint",
                json!({ "token": token, "account": account, "amount": amount.to_string() }),
            )
            .await;
        assert_eq!(status, 200);
    }

    async fn balance(&self, token: &str, account: &str) -> String {
        let (status, body) = self.get(&format!("/ledger/{token}/{account}")).await;
        assert_eq!(status, 200);
        body["balance"].as_str().unwrap_or_default().to_string()
    }

    async fn issue(&self, owner: &str, name: &str, symbol: &str) -> String {
        let (status, body) = self
            .post(
                "/pools",
                json!({ "owner": owner, "payment_asset": "PAY", "name": name, "symbol": symbol }),
            )
            .await;
        assert_eq!(status, 201, "issue failed: {body}");
        let Some(id) = body["pool_id"].as_str() else {
            panic!("missing pool_id in {body}");
        };
        id.to_string()
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::start().await;
    let resp = assert_ok!(
        server
            .client
            .get(format!("{}/health", server.base))
            .send()
            .await
    );
    assert_eq!(resp.status().as_u16(), 200);
    let body = assert_ok!(resp.json::<Value>().await);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["pools"], 0);
}

#[tokio::test]
async fn full_pool_lifecycle() {
    let server = TestServer::start().await;
    server.mint("GOLD", "owner", 1_000).await;
    server.mint("PAY", "alice", 100_000).await;

    let pool_id = server.issue("owner", "Gold Pool", "GLD").await;
    let (_, detail) = server.get(&format!("/pools/{pool_id}")).await;
    assert_eq!(detail["state"], "created");
    assert_eq!(detail["symbol"], "% GLD");

    let (status, asset) = server
        .post(
            &format!("/pools/{pool_id}/assets"),
            json!({ "caller": "owner", "token": "GOLD", "amount": "500" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(asset["amount"], "500");

    let (status, init) = server
        .post(
            &format!("/pools/{pool_id}/initialize"),
            json!({ "caller": "owner", "tax_rate": 10, "share_precision": 0 }),
        )
        .await;
    assert_eq!(status, 200, "initialize failed: {init}");
    assert_eq!(init["total_share_supply"], "100");

    let (status, order) = server
        .post(
            &format!("/pools/{pool_id}/orders/sell"),
            json!({ "caller": "owner", "price": "30", "amount": "10" }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(order["side"], "sell");
    assert_eq!(order["index"], 0);

    let (status, fill) = server
        .post(
            &format!("/pools/{pool_id}/orders/accept"),
            json!({ "caller": "alice", "counterparty": "owner", "amount": "10" }),
        )
        .await;
    assert_eq!(status, 200, "accept failed: {fill}");
    assert_eq!(fill["value"], "300");
    assert_eq!(fill["tax"], "3");
    assert_eq!(fill["closed"], true);

    // 300 for the shares plus 3 tax, both to the owner
    assert_eq!(server.balance("PAY", "alice").await, "99697");
    assert_eq!(server.balance("PAY", "owner").await, "303");

    let (_, orders) = server.get(&format!("/pools/{pool_id}/orders")).await;
    assert_eq!(orders["orders"].as_array().map(Vec::len), Some(0));

    let (_, shares) = server.get(&format!("/pools/{pool_id}/shares/alice")).await;
    assert_eq!(shares["balance"], "10");

    let (status, term) = server
        .post(
            &format!("/pools/{pool_id}/terminate"),
            json!({ "caller": "owner" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(term["state"], "terminated");
    assert_eq!(term["settlement"][0]["amount"], "500");

    let (status, withdrawal) = server
        .post(
            &format!("/pools/{pool_id}/withdraw"),
            json!({ "caller": "alice" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(withdrawal["shares"], "10");
    assert_eq!(server.balance("GOLD", "alice").await, "50");

    let (status, again) = server
        .post(
            &format!("/pools/{pool_id}/withdraw"),
            json!({ "caller": "alice" }),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(again["error"]["code"], 4003);
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let server = TestServer::start().await;
    server.mint("GOLD", "owner", 100).await;
    let pool_id = server.issue("owner", "Gold Pool", "GLD").await;

    // unknown pool
    let (status, body) = server
        .get("/pools/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], 2001);

    // non-owner deposit
    let (status, body) = server
        .post(
            &format!("/pools/{pool_id}/assets"),
            json!({ "caller": "mallory", "token": "GOLD", "amount": "10" }),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"]["code"], 1101);

    // trading before initialization
    let (status, body) = server
        .post(
            &format!("/pools/{pool_id}/orders/sell"),
            json!({ "caller": "owner", "price": "1", "amount": "1" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], 2101);

    // malformed amount never reaches the engine
    let (status, body) = server
        .post(
            &format!("/pools/{pool_id}/assets"),
            json!({ "caller": "owner", "token": "GOLD", "amount": "-5" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], 1001);

    // tax above 100%
    let (status, body) = server
        .post(
            &format!("/pools/{pool_id}/initialize"),
            json!({ "caller": "owner", "tax_rate": 1001, "share_precision": 0 }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], 1003);
}

#[tokio::test]
async fn abort_returns_deposits() {
    let server = TestServer::start().await;
    server.mint("GOLD", "owner", 300).await;
    let pool_id = server.issue("owner", "Gold Pool", "GLD").await;
    let (status, _) = server
        .post(
            &format!("/pools/{pool_id}/assets"),
            json!({ "caller": "owner", "token": "GOLD", "amount": "300" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(server.balance("GOLD", "owner").await, "0");

    let (status, body) = server
        .post(&format!("/pools/{pool_id}/abort"), json!({ "caller": "owner" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["state"], "terminated");
    assert_eq!(server.balance("GOLD", "owner").await, "300");

    let (_, list) = server.get("/pools?state=terminated").await;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn bonding_curve_purchase_and_redeem() {
    let server = TestServer::start().await;
    server.mint("PAY", "alice", 10_000).await;
    let pool_id = server.issue("owner", "Curve Pool", "CRV").await;

    let (status, _) = server
        .post(
            &format!("/pools/{pool_id}/initialize"),
            json!({
                "caller": "owner",
                "tax_rate": 0,
                "share_precision": 0,
                "bonding_reserve": "5000"
            }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, quote) = server
        .post(
            &format!("/pools/{pool_id}/curve/quote"),
            json!({ "side": "buy", "amount": "500" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(quote["amount_out"], "9");

    let (status, trade) = server
        .post(
            &format!("/pools/{pool_id}/curve/purchase"),
            json!({ "caller": "alice", "payment_in": "500", "min_shares_out": "9" }),
        )
        .await;
    assert_eq!(status, 200, "purchase failed: {trade}");
    assert_eq!(trade["shares"], "9");

    // asking for more than the curve gives
    let (status, body) = server
        .post(
            &format!("/pools/{pool_id}/curve/redeem"),
            json!({ "caller": "alice", "shares_in": "9", "min_payment_out": "10000" }),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], 4004);

    let (status, trade) = server
        .post(
            &format!("/pools/{pool_id}/curve/redeem"),
            json!({ "caller": "alice", "shares_in": "9", "min_payment_out": "1" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(trade["payment"], "495");
    assert_eq!(server.balance("PAY", "alice").await, "9995");
}

#[tokio::test]
async fn factory_fee_goes_to_root_pool() {
    let config = GatewayConfig {
        factory_issue_fee: 5,
        ..GatewayConfig::default()
    };
    let server = TestServer::start_with(config).await;
    server.mint("FEE", "owner", 12).await;

    let root = server.issue("admin", "Root", "ROOT").await;

    // only the factory owner may redirect fees
    let (status, body) = server
        .put(
            "/factory/fee",
            json!({ "caller": "mallory", "beneficiary": "mallory" }),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"]["code"], 1101);

    let (status, fee) = server
        .put(
            "/factory/fee",
            json!({ "caller": "admin", "beneficiary": format!("pool:{root}") }),
        )
        .await;
    assert_eq!(status, 200, "fee update failed: {fee}");
    assert_eq!(fee["issue_fee"], "5");
    assert_eq!(fee["owner"], "admin");
    assert_eq!(fee["beneficiary_pool_id"], root);

    server.issue("owner", "First", "ONE").await;
    server.issue("owner", "Second", "TWO").await;
    assert_eq!(server.balance("FEE", "owner").await, "2");

    // a third issue cannot pay
    let (status, body) = server
        .post(
            "/pools",
            json!({ "owner": "owner", "payment_asset": "PAY", "name": "Third", "symbol": "THR" }),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], 4007);
}
