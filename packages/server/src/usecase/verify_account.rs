//! UseCase: 認証コードを確認してアカウントを作成

use std::sync::Arc;

use crate::domain::{
    Email, OtpCode, OtpRepository, PasswordHasher, Timestamp, User, UserRepository,
};

use super::{
    error::UseCaseError,
    register::{RegistrationForm, create_account, ensure_available},
};

/// メール認証後のアカウント作成のユースケース
pub struct VerifyAccountUseCase {
    users: Arc<dyn UserRepository>,
    otps: Arc<dyn OtpRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl VerifyAccountUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        otps: Arc<dyn OtpRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            otps,
            hasher,
        }
    }

    /// # Arguments
    ///
    /// * `email` - 認証コードを送ったメールアドレス
    /// * `code` - ユーザーが入力したコード
    /// * `form` - 登録フォーム（`email` と同じメールアドレスであること）
    pub async fn execute(
        &self,
        email: Option<String>,
        code: Option<String>,
        form: Option<RegistrationForm>,
    ) -> Result<User, UseCaseError> {
        let (Some(email), Some(code), Some(form)) = (email, code, form) else {
            return Err(UseCaseError::validation(
                "Email, verification code and user data are required",
            ));
        };
        let email = Email::new(email)?;
        let code = OtpCode::new(code)?;
        let registration = form.validate()?;
        if registration.email != email {
            return Err(UseCaseError::validation(
                "Email does not match the verification request",
            ));
        }
        ensure_available(self.users.as_ref(), &registration).await?;

        if !self.otps.consume(&email, &code, Timestamp::now()).await? {
            return Err(UseCaseError::validation(
                "Invalid or expired verification code",
            ));
        }

        create_account(self.users.as_ref(), self.hasher.as_ref(), registration).await
    }
}
