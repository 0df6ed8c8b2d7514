//! Diagnostic HTTP endpoints.

use std::sync::Arc;

use axum::{Json, extract::State};
use chattrix_shared::time::{get_utc_timestamp, timestamp_to_rfc3339};

use crate::{infrastructure::dto::http::PresenceResponse, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": timestamp_to_rfc3339(get_utc_timestamp()),
    }))
}

/// Snapshot of online user ids plus live connection and room counts
pub async fn presence(State(state): State<Arc<AppState>>) -> Json<PresenceResponse> {
    let stats = state.hub.stats().await;
    Json(PresenceResponse {
        online_users: stats.online_users.into_iter().map(|id| id.value()).collect(),
        connections: stats.connections,
        rooms: stats.rooms,
    })
}
