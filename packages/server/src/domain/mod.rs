//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod repository;
pub mod value_object;

pub use entity::{
    Chat, ChatEvent, ChatSummary, DELETED_MESSAGE_NOTICE, LatestMessage, Message, NewMessage,
    NewUser, OTP_TTL_MILLIS, OtpVerification, Profile, Registration, USER_SEARCH_LIMIT, User,
    UserCredentials, UserSummary,
};
pub use error::{ConflictField, MessageError, RepositoryError, ValueObjectError};
pub use factory::{ConnectionIdFactory, OtpCodeFactory};
pub use gateway::{GatewayError, ImageStore, Mailer, PasswordHasher};
pub use repository::{ChatRepository, MessageRepository, OtpRepository, UserRepository};
pub use value_object::{
    ChatId, ChatPair, ConnectionId, Email, MessageId, MessageText, OtpCode, Password, Timestamp,
    UserId, Username,
};
