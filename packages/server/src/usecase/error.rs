//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{ConflictField, GatewayError, MessageError, RepositoryError, ValueObjectError};

/// ユースケース共通のエラー
///
/// UI 層でそれぞれ HTTP ステータスに対応付けられる
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UseCaseError {
    /// 入力が不正（400）
    #[error("{0}")]
    Validation(String),

    /// 認証失敗（401）
    #[error("{0}")]
    Auth(String),

    /// 対象が存在しない、または参照権限がない（404）
    #[error("{0}")]
    NotFound(String),

    /// 一意制約違反（400）
    #[error("{0}")]
    Conflict(String),

    /// 想定外の失敗（500）。詳細はログにのみ出す
    #[error("{0}")]
    Internal(String),
}

impl UseCaseError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<ValueObjectError> for UseCaseError {
    fn from(error: ValueObjectError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<MessageError> for UseCaseError {
    fn from(error: MessageError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<RepositoryError> for UseCaseError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict {
                field: ConflictField::Username,
            } => Self::Conflict("Username already exists".to_string()),
            RepositoryError::Conflict {
                field: ConflictField::Email,
            } => Self::Conflict("Email already exists".to_string()),
            RepositoryError::NotFound => Self::NotFound("Not found".to_string()),
            RepositoryError::Database(message) => Self::Internal(message),
        }
    }
}

impl From<GatewayError> for UseCaseError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::UnsupportedImage(_) => Self::Validation(error.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}
