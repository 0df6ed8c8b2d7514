//! UseCase: ユーザー登録
//!
//! メール認証が無効ならその場でアカウントを作成し、
//! 有効なら認証コードを送ってアカウント作成は `VerifyAccountUseCase` に任せる。

use std::sync::Arc;

use crate::domain::{
    Email, Mailer, NewUser, OtpRepository, Password, PasswordHasher, Registration, Timestamp,
    User, UserRepository, Username,
};

use super::{error::UseCaseError, send_otp::issue_otp};

/// 登録フォームの生の入力
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RegistrationForm {
    /// 必須項目と各値オブジェクトの検証
    pub fn validate(self) -> Result<Registration, UseCaseError> {
        let (Some(username), Some(first_name), Some(last_name), Some(email), Some(password)) = (
            required(self.username),
            required(self.first_name),
            required(self.last_name),
            required(self.email),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(UseCaseError::validation(
                "All required fields must be provided",
            ));
        };

        let password = Password::new(password)?;
        let username = Username::new(username)?;
        let email = Email::new(email)?;
        let bio = self.bio.filter(|b| !b.trim().is_empty());

        Ok(Registration {
            username,
            first_name,
            last_name,
            email,
            password,
            bio,
        })
    }
}

/// 登録結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// アカウントを作成した
    Created(User),
    /// 認証コードを送信した
    VerificationSent(Email),
}

/// ユーザー名・メールアドレスの重複確認
pub(crate) async fn ensure_available(
    users: &dyn UserRepository,
    registration: &Registration,
) -> Result<(), UseCaseError> {
    if users.username_taken(registration.username.as_str()).await? {
        return Err(UseCaseError::Conflict("Username already exists".to_string()));
    }
    if users.email_taken(registration.email.as_str()).await? {
        return Err(UseCaseError::Conflict("Email already exists".to_string()));
    }
    Ok(())
}

/// パスワードをハッシュ化してユーザーを保存
pub(crate) async fn create_account(
    users: &dyn UserRepository,
    hasher: &dyn PasswordHasher,
    registration: Registration,
) -> Result<User, UseCaseError> {
    let password_hash = hasher.hash(&registration.password)?;
    let user = users
        .create(NewUser {
            username: registration.username,
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            password_hash,
            bio: registration.bio,
            created_at: Timestamp::now(),
        })
        .await?;
    tracing::info!("User {} ('{}') registered", user.id, user.username);
    Ok(user)
}

/// ユーザー登録のユースケース
pub struct RegisterUseCase {
    users: Arc<dyn UserRepository>,
    otps: Arc<dyn OtpRepository>,
    mailer: Arc<dyn Mailer>,
    hasher: Arc<dyn PasswordHasher>,
    /// true ならメール認証を経てからアカウントを作成する
    email_verification: bool,
}

impl RegisterUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        otps: Arc<dyn OtpRepository>,
        mailer: Arc<dyn Mailer>,
        hasher: Arc<dyn PasswordHasher>,
        email_verification: bool,
    ) -> Self {
        Self {
            users,
            otps,
            mailer,
            hasher,
            email_verification,
        }
    }

    pub async fn execute(&self, form: RegistrationForm) -> Result<RegisterOutcome, UseCaseError> {
        let registration = form.validate()?;
        ensure_available(self.users.as_ref(), &registration).await?;

        if self.email_verification {
            issue_otp(self.otps.as_ref(), self.mailer.as_ref(), &registration.email).await?;
            return Ok(RegisterOutcome::VerificationSent(registration.email));
        }

        let user = create_account(self.users.as_ref(), self.hasher.as_ref(), registration).await?;
        Ok(RegisterOutcome::Created(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            gateway::{MockMailer, MockPasswordHasher},
            repository::{MockOtpRepository, MockUserRepository},
        },
        usecase::test_support::user,
    };

    fn form() -> RegistrationForm {
        RegistrationForm {
            username: Some("alice".to_string()),
            first_name: Some("Alice".to_string()),
            last_name: Some("Liddell".to_string()),
            email: Some("alice@example.com".to_string()),
            password: Some("secret123".to_string()),
            bio: None,
        }
    }

    fn available_users() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_username_taken().returning(|_| Ok(false));
        users.expect_email_taken().returning(|_| Ok(false));
        users
    }

    fn hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Ok("$argon2id$hash".to_string()));
        hasher
    }

    #[test]
    fn test_validate_requires_all_fields() {
        // テスト項目: 必須項目が欠けていれば Validation
        let mut missing = form();
        missing.last_name = Some("   ".to_string());

        assert_eq!(
            missing.validate().unwrap_err(),
            UseCaseError::validation("All required fields must be provided")
        );
    }

    #[test]
    fn test_validate_rejects_short_password_and_bad_email() {
        // テスト項目: パスワード 6 文字未満・不正なメールは Validation
        let mut short = form();
        short.password = Some("12345".to_string());
        let mut bad_email = form();
        bad_email.email = Some("alice.example.com".to_string());

        assert_eq!(
            short.validate().unwrap_err(),
            UseCaseError::validation("Password must be at least 6 characters long")
        );
        assert!(matches!(
            bad_email.validate().unwrap_err(),
            UseCaseError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_register_creates_user_without_verification() {
        // テスト項目: メール認証無効ならユーザーが作成される
        // given (前提条件):
        let mut users = available_users();
        users
            .expect_create()
            .withf(|new_user| {
                new_user.username.as_str() == "alice" && new_user.password_hash == "$argon2id$hash"
            })
            .returning(|_| Ok(user(1, "alice")));
        let usecase = RegisterUseCase::new(
            Arc::new(users),
            Arc::new(MockOtpRepository::new()),
            Arc::new(MockMailer::new()),
            Arc::new(hasher()),
            false,
        );

        // when (操作):
        let outcome = usecase.execute(form()).await;

        // then (期待する結果):
        assert_eq!(outcome.unwrap(), RegisterOutcome::Created(user(1, "alice")));
    }

    #[tokio::test]
    async fn test_register_sends_code_with_verification() {
        // テスト項目: メール認証有効なら認証コードを保存・送信し、ユーザーは作成しない
        // given (前提条件):
        let mut otps = MockOtpRepository::new();
        otps.expect_save().times(1).returning(|_, _| Ok(()));
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_otp()
            .withf(|email, _| email.as_str() == "alice@example.com")
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = RegisterUseCase::new(
            Arc::new(available_users()),
            Arc::new(otps),
            Arc::new(mailer),
            Arc::new(MockPasswordHasher::new()),
            true,
        );

        // when (操作):
        let outcome = usecase.execute(form()).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            outcome,
            RegisterOutcome::VerificationSent(Email::new("alice@example.com".to_string()).unwrap())
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        // テスト項目: ユーザー名が使用済みなら Conflict
        let mut users = MockUserRepository::new();
        users.expect_username_taken().returning(|_| Ok(true));
        let usecase = RegisterUseCase::new(
            Arc::new(users),
            Arc::new(MockOtpRepository::new()),
            Arc::new(MockMailer::new()),
            Arc::new(MockPasswordHasher::new()),
            false,
        );

        let result = usecase.execute(form()).await;

        assert_eq!(
            result.unwrap_err(),
            UseCaseError::Conflict("Username already exists".to_string())
        );
    }
}
