//! Outbound collaborators other than the relational store.
//!
//! Mail delivery, image storage and password hashing sit behind these traits
//! so use cases can be exercised without SMTP, disk or Argon2 cost.

use async_trait::async_trait;
use thiserror::Error;

use super::{Email, OtpCode, Password};

/// Errors raised by gateway implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Image storage failed: {0}")]
    Storage(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Delivers verification codes to users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, recipient: &Email, code: &OtpCode) -> Result<(), GatewayError>;
}

/// Stores uploaded message images and hands back a public URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes` and return the URL clients fetch it from
    async fn save(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, GatewayError>;

    /// Remove a previously stored image. Unknown URLs are ignored.
    async fn remove(&self, url: &str) -> Result<(), GatewayError>;
}

/// One-way password hashing
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &Password) -> Result<String, GatewayError>;

    /// `Ok(false)` on mismatch, `Err` only when the stored hash is unreadable
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, GatewayError>;
}
