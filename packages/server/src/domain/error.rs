//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// Email validation error
    #[error("Email cannot be empty")]
    EmailEmpty,

    /// Email invalid format error
    #[error("Email must be a valid address (got: {0})")]
    EmailInvalidFormat(String),

    /// Password too short error
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize, actual: usize },

    /// MessageText validation error
    #[error("Message text cannot be empty")]
    MessageTextEmpty,

    /// MessageText too long error
    #[error("Message text cannot exceed {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },

    /// OTP code must be six digits
    #[error("Verification code must be 6 digits")]
    OtpCodeInvalidFormat,

    /// A chat needs two distinct users
    #[error("Cannot create chat with yourself")]
    ChatWithSelf,

    /// ConnectionId invalid format error (not a valid UUID format)
    #[error("ConnectionId must be a valid UUID format (got: {0})")]
    ConnectionIdInvalidFormat(String),
}

/// Errors related to Message domain logic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Neither text nor image was supplied
    #[error("Message text or image is required")]
    Empty,
}

/// Unique columns that can raise a conflict on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
}

/// Errors raised by repository implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Unique constraint violated
    #[error("Unique constraint violated on {field:?}")]
    Conflict { field: ConflictField },

    /// Referenced row does not exist
    #[error("Record not found")]
    NotFound,

    /// Underlying store failure
    #[error("Database error: {0}")]
    Database(String),
}
