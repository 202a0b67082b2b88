//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PoolEvent;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Response to the command with the given `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Error reply. `code` follows the REST error codes.
    #[must_use]
    pub fn error(id: String, code: u32, message: impl Into<String>) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }

    /// Broadcast of a pool event under a fresh id.
    #[must_use]
    pub fn event(event: &PoolEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload: serde_json::to_value(event).unwrap_or_default(),
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the payload
/// of a `command` message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific pools.
    Subscribe {
        /// Pool IDs to subscribe to. Use `["*"]` for all pools.
        pool_ids: Vec<String>,
        /// Restrict delivery to these event types (e.g. `"order_filled"`).
        /// Empty keeps every type.
        #[serde(default)]
        event_types: Vec<String>,
    },
    /// Unsubscribe from events for specific pools. `"*"` drops the
    /// wildcard.
    Unsubscribe {
        /// Pool IDs to unsubscribe from.
        pool_ids: Vec<String>,
    },
    /// Get full pool state.
    GetState {
        /// Target pool ID.
        pool_id: String,
    },
    /// Get the open orders of a pool.
    GetOrders {
        /// Target pool ID.
        pool_id: String,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_command_parses_with_default_filter() {
        let payload = serde_json::json!({"command": "subscribe", "pool_ids": ["*"]});
        let Ok(WsCommand::Subscribe {
            pool_ids,
            event_types,
        }) = serde_json::from_value::<WsCommand>(payload)
        else {
            panic!("expected subscribe");
        };
        assert_eq!(pool_ids, vec!["*".to_string()]);
        assert!(event_types.is_empty());
    }

    #[test]
    fn unknown_command_is_rejected() {
        let payload = serde_json::json!({"command": "rebalance", "pool_id": "x"});
        assert!(serde_json::from_value::<WsCommand>(payload).is_err());
    }

    #[test]
    fn error_envelope_carries_code() {
        let msg = WsMessage::error("c1".to_string(), 2001, "pool not found");
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload.get("code").and_then(|v| v.as_u64()), Some(2001));
    }
}
