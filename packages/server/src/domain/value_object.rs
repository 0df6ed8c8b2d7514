//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Maximum username length in characters
pub const USERNAME_MAX_LENGTH: usize = 50;

/// Minimum password length in characters
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Maximum message text length in characters
pub const MESSAGE_TEXT_MAX_LENGTH: usize = 10_000;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the inner i64 value.
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// User identifier (primary key of `users`).
    UserId
);
numeric_id!(
    /// Chat identifier (primary key of `chats`). Also names the push-channel room.
    ChatId
);
numeric_id!(
    /// Message identifier (primary key of `messages`).
    MessageId
);

/// Live push-channel connection identifier.
///
/// Opaque and unique per transport connection; a reconnect gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a connection id from its hyphenated string form.
    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        uuid::Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ValueObjectError::ConnectionIdInvalidFormat(value.to_string()))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username value object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create a new Username. Surrounding whitespace is trimmed.
    pub fn new(username: String) -> Result<Self, ValueObjectError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        let len = username.chars().count();
        if len > USERNAME_MAX_LENGTH {
            return Err(ValueObjectError::UsernameTooLong {
                max: USERNAME_MAX_LENGTH,
                actual: len,
            });
        }
        Ok(Self(username))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Email address value object.
///
/// Only a shape check: non-empty local part and domain around a single `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new Email. Surrounding whitespace is trimmed.
    pub fn new(email: String) -> Result<Self, ValueObjectError> {
        let email = email.trim().to_string();
        if email.is_empty() {
            return Err(ValueObjectError::EmailEmpty);
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
                Ok(Self(email))
            }
            _ => Err(ValueObjectError::EmailInvalidFormat(email)),
        }
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plaintext password as submitted by a client. Never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Create a new Password, enforcing the minimum length.
    pub fn new(password: String) -> Result<Self, ValueObjectError> {
        let len = password.chars().count();
        if len < PASSWORD_MIN_LENGTH {
            return Err(ValueObjectError::PasswordTooShort {
                min: PASSWORD_MIN_LENGTH,
                actual: len,
            });
        }
        Ok(Self(password))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Message text value object.
///
/// Represents the text body of a chat message with validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    /// Create a new MessageText.
    ///
    /// # Arguments
    ///
    /// * `text` - The message text
    ///
    /// # Returns
    ///
    /// A Result containing the MessageText or an error if validation fails
    pub fn new(text: String) -> Result<Self, ValueObjectError> {
        if text.is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        let len = text.chars().count();
        if len > MESSAGE_TEXT_MAX_LENGTH {
            return Err(ValueObjectError::MessageTextTooLong {
                max: MESSAGE_TEXT_MAX_LENGTH,
                actual: len,
            });
        }
        Ok(Self(text))
    }

    /// Treat `None` and the empty string alike as "no text".
    pub fn from_optional(text: Option<String>) -> Result<Option<Self>, ValueObjectError> {
        match text {
            Some(text) if !text.is_empty() => Self::new(text).map(Some),
            _ => Ok(None),
        }
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of digits in a one-time verification code
pub const OTP_CODE_LENGTH: usize = 6;

/// One-time email verification code (six ASCII digits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Create a new OtpCode from user input. Surrounding whitespace is trimmed.
    pub fn new(code: String) -> Result<Self, ValueObjectError> {
        let code = code.trim().to_string();
        if code.len() != OTP_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValueObjectError::OtpCodeInvalidFormat);
        }
        Ok(Self(code))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Canonically ordered pair of distinct users sharing a chat.
///
/// `first() < second()` always holds, so `(a, b)` and `(b, a)` produce the
/// same pair. This is what the `chats` uniqueness constraint is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatPair {
    first: UserId,
    second: UserId,
}

impl ChatPair {
    /// Build the canonical pair for two users.
    pub fn new(a: UserId, b: UserId) -> Result<Self, ValueObjectError> {
        if a == b {
            return Err(ValueObjectError::ChatWithSelf);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    /// The smaller user id.
    pub fn first(&self) -> UserId {
        self.first
    }

    /// The larger user id.
    pub fn second(&self) -> UserId {
        self.second
    }

    /// Whether `user` is one of the two participants.
    pub fn contains(&self, user: UserId) -> bool {
        self.first == user || self.second == user
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp.
    ///
    /// # Arguments
    ///
    /// * `value` - Unix timestamp in milliseconds
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self(chattrix_shared::time::get_utc_timestamp())
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Timestamp shifted forward by `millis`.
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// RFC 3339 representation used on the wire.
    pub fn to_rfc3339(&self) -> String {
        chattrix_shared::time::timestamp_to_rfc3339(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
