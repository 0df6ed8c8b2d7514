//! UseCase: 認証コードの（再）送信

use std::sync::Arc;

use crate::domain::{
    Email, Mailer, OTP_TTL_MILLIS, OtpCodeFactory, OtpRepository, OtpVerification, Timestamp,
};

use super::error::UseCaseError;

/// 認証コードを生成・保存してメールで送る
pub(crate) async fn issue_otp(
    otps: &dyn OtpRepository,
    mailer: &dyn Mailer,
    email: &Email,
) -> Result<(), UseCaseError> {
    let now = Timestamp::now();
    let code = OtpCodeFactory::generate()?;
    otps.save(
        OtpVerification {
            email: email.clone(),
            code: code.clone(),
            expires_at: now.plus_millis(OTP_TTL_MILLIS),
        },
        now,
    )
    .await?;
    mailer.send_otp(email, &code).await?;
    tracing::info!("Verification code issued for '{}'", email);
    Ok(())
}

/// 認証コード送信のユースケース
pub struct SendOtpUseCase {
    otps: Arc<dyn OtpRepository>,
    mailer: Arc<dyn Mailer>,
}

impl SendOtpUseCase {
    pub fn new(otps: Arc<dyn OtpRepository>, mailer: Arc<dyn Mailer>) -> Self {
        Self { otps, mailer }
    }

    pub async fn execute(&self, email: Option<String>) -> Result<Email, UseCaseError> {
        let email = email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| UseCaseError::validation("Email is required"))?;
        let email = Email::new(email)?;
        issue_otp(self.otps.as_ref(), self.mailer.as_ref(), &email).await?;
        Ok(email)
    }
}
