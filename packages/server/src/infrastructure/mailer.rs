//! Verification-code mail over SMTP.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Mailbox, Message, header},
    transport::smtp::authentication::Credentials,
};

use crate::domain::{Email, GatewayError, Mailer, OtpCode};

/// SMTP connection settings
#[derive(Debug, Clone, Default)]
pub struct SmtpSettings {
    /// Empty host switches the mailer to log-only mode
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

/// Async SMTP mailer, or a no-op that only logs when no host is configured
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, GatewayError> {
        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|e| GatewayError::Mail(format!("Invalid sender address: {}", e)))?;

        let transport = if settings.host.trim().is_empty() {
            tracing::warn!("SMTP host not configured; verification mail runs in no-op mode");
            None
        } else {
            let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| GatewayError::Mail(format!("Failed to configure SMTP: {}", e)))?
                .port(settings.port);
            let builder = match (&settings.username, &settings.password) {
                (Some(username), Some(password)) => {
                    builder.credentials(Credentials::new(username.clone(), password.clone()))
                }
                _ => builder,
            };
            Some(Arc::new(builder.build()))
        };

        Ok(Self { transport, from })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, recipient: &Email, code: &OtpCode) -> Result<(), GatewayError> {
        let Some(transport) = &self.transport else {
            tracing::info!(
                recipient = recipient.as_str(),
                code = code.as_str(),
                "Mailer in no-op mode; skipping verification mail"
            );
            return Ok(());
        };

        let to = recipient
            .as_str()
            .parse::<Mailbox>()
            .map_err(|e| GatewayError::Mail(format!("Invalid recipient address: {}", e)))?;
        let body = format!(
            "Your Chattrix verification code is {}.\n\nIt expires in 10 minutes. \
             If you did not request this, you can ignore this email.",
            code.as_str()
        );
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your Chattrix verification code")
            .header(header::ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| GatewayError::Mail(format!("Failed to build message: {}", e)))?;

        transport
            .send(email)
            .await
            .map_err(|e| GatewayError::Mail(format!("Failed to send: {}", e)))?;
        tracing::info!(recipient = recipient.as_str(), "Verification mail sent");
        Ok(())
    }
}
