//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, header},
    response::IntoResponse,
};
use futures_util::stream::StreamExt;
use serde::Deserialize;

use crate::{domain::DisplayName, ui::state::AppState, usecase::resolve_display_name};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub name: Option<String>,
}

/// GET /events
///
/// Upgrades to a WebSocket and serves it until it closes. The display name
/// comes from `?name=`, falling back to the User-Agent header.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());
    let name = resolve_display_name(query.name.as_deref(), user_agent);
    let max_message_size = state.accept_connection_usecase.settings().max_message_size;

    ws.max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_failed_upgrade(|e| tracing::warn!("Failed to upgrade WebSocket: {}", e))
        .on_upgrade(move |socket| handle_socket(socket, state, name))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, name: DisplayName) {
    let (sink, stream) = socket.split();
    state
        .accept_connection_usecase
        .execute(sink, stream, name)
        .await;
}
