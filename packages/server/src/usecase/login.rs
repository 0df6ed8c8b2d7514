//! UseCase: ログイン

use std::sync::Arc;

use crate::domain::{PasswordHasher, User, UserRepository};

use super::error::UseCaseError;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// ログインのユースケース
pub struct LoginUseCase {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl LoginUseCase {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    pub async fn execute(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<User, UseCaseError> {
        let (Some(username), Some(password)) = (
            username.filter(|u| !u.trim().is_empty()),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(UseCaseError::validation(
                "Username and password are required",
            ));
        };

        let Some(credentials) = self.users.find_credentials(username.trim()).await? else {
            return Err(UseCaseError::Auth(INVALID_CREDENTIALS.to_string()));
        };
        if !self.hasher.verify(&password, &credentials.password_hash)? {
            tracing::info!("Failed login for '{}'", username);
            return Err(UseCaseError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!("User {} logged in", credentials.user.id);
        Ok(credentials.user)
    }
}
