//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade to a WebSocket streaming pool events.
///
/// The event receiver is created before the upgrade completes, so no event
/// published after the handshake is missed.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let event_rx = state.event_bus.subscribe();
    let pool_service = Arc::clone(&state.pool_service);
    tracing::debug!(
        subscribers = state.event_bus.receiver_count(),
        "ws upgrade"
    );

    ws.on_upgrade(move |socket| run_connection(socket, event_rx, pool_service))
}
