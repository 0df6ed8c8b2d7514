//! Handler modules for HTTP and WebSocket endpoints.

pub mod auth;
pub mod chat;
pub mod http;
pub mod user;
pub mod websocket;

use crate::{
    domain::User,
    ui::{error::ApiError, state::AppState},
    usecase::AuthenticateUseCase,
};

// Re-export HTTP handlers
pub use auth::{account_creation, login, logout, register, send_otp};
pub use chat::{create_chat, delete_message, get_chat, get_messages, list_chats, send_message};
pub use http::{health_check, presence};
pub use user::{get_user, profile_by_username, search_users};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;

/// 呼び出し元の `userId` を実在するユーザーに解決する
async fn authenticate(state: &AppState, user_id: Option<i64>) -> Result<User, ApiError> {
    Ok(AuthenticateUseCase::new(state.users.clone())
        .execute(user_id)
        .await?)
}
