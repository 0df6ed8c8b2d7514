//! UseCase: ユーザー検索・取得・プロフィール参照

use std::sync::Arc;

use crate::domain::{Profile, USER_SEARCH_LIMIT, User, UserId, UserRepository};

use super::error::UseCaseError;

/// ユーザー名の部分一致検索のユースケース
pub struct SearchUsersUseCase {
    users: Arc<dyn UserRepository>,
}

impl SearchUsersUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// 空の検索語は空リストを返す。検索した本人は結果に含まれない
    pub async fn execute(
        &self,
        requester: UserId,
        term: Option<String>,
    ) -> Result<Vec<User>, UseCaseError> {
        let term = term.unwrap_or_default();
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.users.search(term, requester, USER_SEARCH_LIMIT).await?)
    }
}

/// ID によるユーザー取得のユースケース
pub struct GetUserUseCase {
    users: Arc<dyn UserRepository>,
}

impl GetUserUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<User, UseCaseError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UseCaseError::not_found("User not found"))
    }
}

/// ユーザー名による公開プロフィール取得のユースケース
pub struct GetProfileUseCase {
    users: Arc<dyn UserRepository>,
}

impl GetProfileUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, username: &str) -> Result<Profile, UseCaseError> {
        self.users
            .find_profile(username.trim())
            .await?
            .ok_or_else(|| UseCaseError::not_found("User not found"))
    }
}
