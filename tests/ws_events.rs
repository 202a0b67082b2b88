//! WebSocket feed tests: subscriptions, event filtering and state queries
//! over a real socket with `tokio-tungstenite`.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use stakepool_gateway::app::build_app;
use stakepool_gateway::app_state::AppState;
use stakepool_gateway::config::GatewayConfig;
use stakepool_gateway::domain::PoolId;
use stakepool_gateway::engine::{AccountId, InitParams, TokenId};
use stakepool_gateway::service::PoolService;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start() -> (Arc<PoolService>, Socket) {
    let config = GatewayConfig::default();
    let state = AppState::from_config(&config);
    let service = Arc::clone(&state.pool_service);
    let app = build_app(state, &config);

    let listener = assert_ok!(tokio::net::TcpListener::bind("127.0.0.1:0").await);
    let addr = assert_ok!(listener.local_addr());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let (socket, _) = assert_ok!(tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await);
    (service, socket)
}

async fn send_command(socket: &mut Socket, id: &str, payload: Value) {
    let msg = json!({
        "id": id,
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": payload,
    });
    assert_ok!(socket.send(Message::text(msg.to_string())).await);
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), socket.next()).await;
        let Ok(Some(Ok(msg))) = next else {
            panic!("no message within timeout");
        };
        if let Message::Text(text) = msg {
            return assert_ok!(serde_json::from_str(text.as_str()));
        }
    }
}

async fn issue(service: &PoolService) -> PoolId {
    assert_ok!(
        service
            .issue_pool(
                AccountId::from("owner"),
                TokenId::from("PAY"),
                "Gold Pool",
                "GLD",
            )
            .await
    )
}

#[tokio::test]
async fn subscription_filters_by_event_type() {
    let (service, mut socket) = start().await;
    let pool_id = issue(&service).await;

    send_command(
        &mut socket,
        "sub-1",
        json!({
            "command": "subscribe",
            "pool_ids": [pool_id.to_string()],
            "event_types": ["order_opened"],
        }),
    )
    .await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "sub-1");
    assert_eq!(reply["payload"]["count"], 1);

    let owner = AccountId::from("owner");
    assert_ok!(
        service
            .initialize(pool_id, &owner, InitParams::default())
            .await
    );
    assert_ok!(service.sell(pool_id, &owner, 5, 10).await);

    // pool_initialized is filtered out
    let event = next_json(&mut socket).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event_type"], "order_opened");
    assert_eq!(event["payload"]["pool_id"], pool_id.to_string());
}

#[tokio::test]
async fn wildcard_receives_new_pools() {
    let (service, mut socket) = start().await;

    send_command(
        &mut socket,
        "all",
        json!({ "command": "subscribe", "pool_ids": ["*"] }),
    )
    .await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["wildcard"], true);

    let pool_id = issue(&service).await;
    let event = next_json(&mut socket).await;
    assert_eq!(event["payload"]["event_type"], "pool_issued");
    assert_eq!(event["payload"]["pool_id"], pool_id.to_string());
    assert_eq!(event["payload"]["symbol"], "% GLD");
}

#[tokio::test]
async fn get_state_and_errors() {
    let (service, mut socket) = start().await;
    let pool_id = issue(&service).await;

    send_command(
        &mut socket,
        "state-1",
        json!({ "command": "get_state", "pool_id": pool_id.to_string() }),
    )
    .await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["payload"]["state"], "created");
    assert_eq!(reply["payload"]["name"], "Gold Pool");

    send_command(
        &mut socket,
        "state-2",
        json!({ "command": "get_state", "pool_id": PoolId::new().to_string() }),
    )
    .await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 2001);

    assert_ok!(socket.send(Message::text("{not json".to_string())).await);
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 1001);
}
