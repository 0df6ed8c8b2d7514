//! UseCase: 呼び出し元ユーザーの確認
//!
//! REST の各 API はリクエストに含まれる `userId` を信頼せず、
//! 実在するユーザーかどうかをここで確認する。

use std::sync::Arc;

use crate::domain::{User, UserId, UserRepository};

use super::error::UseCaseError;

/// 呼び出し元ユーザー確認のユースケース
pub struct AuthenticateUseCase {
    users: Arc<dyn UserRepository>,
}

impl AuthenticateUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// `user_id` が実在するユーザーなら、そのユーザーを返す
    ///
    /// # Returns
    ///
    /// * `Err(UseCaseError::Auth)` - `user_id` がない、または存在しない
    pub async fn execute(&self, user_id: Option<i64>) -> Result<User, UseCaseError> {
        let Some(user_id) = user_id else {
            return Err(UseCaseError::Auth("User ID is required".to_string()));
        };
        self.users
            .find_by_id(UserId::new(user_id))
            .await?
            .ok_or_else(|| UseCaseError::Auth("Invalid user".to_string()))
    }
}
