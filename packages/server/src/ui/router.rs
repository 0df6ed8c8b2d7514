//! Route table.

use std::{path::Path, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::{handler, state::AppState};
use crate::infrastructure::storage::UPLOADS_ROUTE;

/// Largest accepted request body (image uploads)
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// CORS for `origin`, or any origin for `*`
pub fn cors_layer(origin: &str) -> Result<CorsLayer, String> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin = HeaderValue::from_str(origin.trim())
        .map_err(|e| format!("Invalid CORS origin '{}': {}", origin, e))?;
    Ok(layer.allow_origin(origin))
}

/// REST routes (mounted under `/api`)
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handler::health_check))
        .route("/presence", get(handler::presence))
        .route("/auth/register", post(handler::register))
        .route("/auth/accountCreation", post(handler::account_creation))
        .route("/auth/sendOtp", post(handler::send_otp))
        .route("/auth/login", post(handler::login))
        .route("/auth/logout", post(handler::logout))
        .route("/users/search", get(handler::search_users))
        .route(
            "/users/by-username/{username}",
            get(handler::profile_by_username),
        )
        .route("/users/{id}", get(handler::get_user))
        .route(
            "/chats",
            get(handler::list_chats).post(handler::create_chat),
        )
        .route("/chats/{id}", get(handler::get_chat))
        .route(
            "/chats/{id}/messages",
            get(handler::get_messages).post(handler::send_message),
        )
        .route(
            "/chats/{id}/messages/{message_id}",
            delete(handler::delete_message),
        )
}

/// Full application: `/api`, `/ws` and the uploaded images
pub fn build_router(state: Arc<AppState>, upload_dir: &Path, cors: CorsLayer) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws", get(handler::websocket_handler))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
