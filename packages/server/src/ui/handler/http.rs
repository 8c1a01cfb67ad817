//! HTTP endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::Html,
};

use crate::{hub::MemberSnapshot, infrastructure::render_home_page, ui::state::AppState};

/// GET /
pub async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let websocket_url = format!("ws://{}/events", host);

    let history = state.publish_webhook_usecase.recent_messages().await;
    Html(render_home_page(&websocket_url, history.iter()))
}

/// POST /webhook
///
/// The raw body is published to every connected client.
pub async fn webhook(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    match state.publish_webhook_usecase.execute(body).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Failed to publish webhook: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/clients
///
/// Currently registered clients, for diagnostics.
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberSnapshot>>, StatusCode> {
    state
        .list_clients_usecase
        .execute()
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Failed to list clients: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })
}
