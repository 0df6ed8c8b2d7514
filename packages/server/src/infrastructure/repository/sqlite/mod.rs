//! SQLite Repository 実装
//!
//! ドメイン層の Repository trait を sqlx の `SqlitePool` 上に実装します。
//! DB の行はいったん `*Row` 構造体で受けてからドメインモデルに変換します。
//!
//! ```text
//! DB Row → *Row (FromRow) → ドメインモデル
//! ```

mod chat;
mod message;
mod otp;
mod user;

pub use chat::SqliteChatRepository;
pub use message::SqliteMessageRepository;
pub use otp::SqliteOtpRepository;
pub use user::SqliteUserRepository;

use crate::domain::{ConflictField, RepositoryError};

/// sqlx のエラーをドメインの RepositoryError に変換
pub(crate) fn map_db_error(error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            let message = db.message();
            if message.contains("users.username") {
                return RepositoryError::Conflict {
                    field: ConflictField::Username,
                };
            }
            if message.contains("users.email") {
                return RepositoryError::Conflict {
                    field: ConflictField::Email,
                };
            }
        }
        if db.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    tracing::error!("Database error: {}", error);
    RepositoryError::Database(error.to_string())
}

/// LIKE パターン用に `\`, `%`, `_` をエスケープ（`ESCAPE '\'` と組み合わせる）
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
