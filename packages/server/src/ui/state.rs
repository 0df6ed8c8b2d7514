//! Shared application state.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    domain::{
        ChatRepository, ImageStore, Mailer, MessageRepository, OtpRepository, PasswordHasher,
        UserRepository,
    },
    infrastructure::{
        password::Argon2PasswordHasher,
        repository::{
            SqliteChatRepository, SqliteMessageRepository, SqliteOtpRepository,
            SqliteUserRepository,
        },
    },
    realtime::RealtimeHub,
};

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub users: Arc<dyn UserRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub otps: Arc<dyn OtpRepository>,
    /// 外部サービス
    pub mailer: Arc<dyn Mailer>,
    pub images: Arc<dyn ImageStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    /// 接続・在席・ルームの管理（プロセスに 1 つ）
    pub hub: Arc<RealtimeHub>,
    /// true なら登録時にメール認証を挟む
    pub email_verification: bool,
}

impl AppState {
    /// SQLite の各リポジトリで組み立てる
    pub fn new(
        pool: SqlitePool,
        mailer: Arc<dyn Mailer>,
        images: Arc<dyn ImageStore>,
        email_verification: bool,
    ) -> Self {
        Self {
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            chats: Arc::new(SqliteChatRepository::new(pool.clone())),
            messages: Arc::new(SqliteMessageRepository::new(pool.clone())),
            otps: Arc::new(SqliteOtpRepository::new(pool)),
            mailer,
            images,
            hasher: Arc::new(Argon2PasswordHasher::new()),
            hub: Arc::new(RealtimeHub::new()),
            email_verification,
        }
    }
}
