//! Domain factories for creating domain entities and value objects.

use rand::Rng;

use super::{
    ConnectionId, OtpCode,
    error::ValueObjectError,
};

/// Factory for generating ConnectionId instances.
///
/// This factory encapsulates the logic for generating new connection
/// identifiers, separating the generation concern from parsing in ConnectionId.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a new ConnectionId with a random UUID v4.
    pub fn generate() -> ConnectionId {
        ConnectionId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Factory for generating one-time email verification codes.
pub struct OtpCodeFactory;

impl OtpCodeFactory {
    /// Generate a random six-digit code in `100000..=999999`.
    ///
    /// # Errors
    ///
    /// This method should not fail in practice, but returns Result for consistency
    /// with the domain error handling pattern.
    pub fn generate() -> Result<OtpCode, ValueObjectError> {
        let value: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        OtpCode::new(value.to_string())
    }
}
