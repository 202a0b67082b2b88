//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::api::dto::{OrderDto, PoolDetailResponse};
use crate::domain::{PoolEvent, PoolId};
use crate::error::GatewayError;
use crate::service::PoolService;

const MALFORMED: u32 = 1001;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<PoolEvent>,
    pool_service: Arc<PoolService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &pool_service).await;
                        let json = serde_json::to_string(&reply).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(pool_event) => {
                        if subs.matches(&pool_event) {
                            let json = serde_json::to_string(&WsMessage::event(&pool_event))
                                .unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles one text frame from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    pool_service: &PoolService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), MALFORMED, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, MALFORMED, "expected a command message");
    }
    let command = match serde_json::from_value::<WsCommand>(msg.payload) {
        Ok(command) => command,
        Err(err) => {
            return WsMessage::error(msg.id, MALFORMED, format!("unknown command: {err}"));
        }
    };

    match command {
        WsCommand::Subscribe {
            pool_ids,
            event_types,
        } => {
            let (ids, wildcard) = parse_targets(&pool_ids);
            subs.subscribe(&ids, wildcard, &event_types);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                    "event_types": subs.event_types(),
                }),
            )
        }
        WsCommand::Unsubscribe { pool_ids } => {
            let (ids, wildcard) = parse_targets(&pool_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetState { pool_id } => {
            let result = match parse_pool_id(&pool_id) {
                Ok(pool_id) => pool_service.get_pool(pool_id).await.map(|entry| {
                    serde_json::to_value(PoolDetailResponse::from(&entry)).unwrap_or_default()
                }),
                Err(err) => Err(err),
            };
            reply(msg.id, result)
        }
        WsCommand::GetOrders { pool_id } => {
            let result = match parse_pool_id(&pool_id) {
                Ok(pool_id) => pool_service.orders(pool_id).await.map(|orders| {
                    let orders: Vec<OrderDto> = orders.iter().map(OrderDto::from).collect();
                    serde_json::json!({ "pool_id": pool_id, "orders": orders })
                }),
                Err(err) => Err(err),
            };
            reply(msg.id, result)
        }
    }
}

fn reply(id: String, result: Result<serde_json::Value, GatewayError>) -> WsMessage {
    match result {
        Ok(payload) => WsMessage::response(id, payload),
        Err(err) => WsMessage::error(id, err.error_code(), err.to_string()),
    }
}

/// Splits subscription targets into pool ids and the `"*"` wildcard.
/// Unparseable ids are skipped.
fn parse_targets(targets: &[String]) -> (Vec<PoolId>, bool) {
    let wildcard = targets.iter().any(|target| target == "*");
    let ids = targets
        .iter()
        .filter_map(|target| target.parse::<uuid::Uuid>().ok())
        .map(PoolId::from_uuid)
        .collect();
    (ids, wildcard)
}

fn parse_pool_id(raw: &str) -> Result<PoolId, GatewayError> {
    raw.parse::<uuid::Uuid>()
        .map(PoolId::from_uuid)
        .map_err(|_| GatewayError::InvalidRequest(format!("invalid pool id {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_split_wildcard_and_ids() {
        let id = PoolId::new();
        let (ids, wildcard) =
            parse_targets(&["*".to_string(), id.to_string(), "junk".to_string()]);
        assert!(wildcard);
        assert_eq!(ids, vec![id]);
    }

    #[test]
    fn bad_pool_id_is_invalid_request() {
        assert!(matches!(
            parse_pool_id("nope"),
            Err(GatewayError::InvalidRequest(_))
        ));
    }
}
