//! Core domain models for the chat application.

use super::{
    error::MessageError,
    value_object::{
        ChatId, Email, MessageId, MessageText, OtpCode, Password, Timestamp, UserId, Username,
    },
};

/// Text shown in place of a message that its sender deleted
pub const DELETED_MESSAGE_NOTICE: &str = "user deleted this message";

/// Lifetime of an email verification code (10 minutes)
pub const OTP_TTL_MILLIS: i64 = 10 * 60 * 1000;

/// Maximum number of rows returned by a username search
pub const USER_SEARCH_LIMIT: i64 = 20;

/// A registered user as exposed to other users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

/// A user row together with its stored password hash.
///
/// Only the login path ever sees this.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Validated registration data, before hashing
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: Password,
    pub bio: Option<String>,
}

/// Insert payload for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub bio: Option<String>,
    pub created_at: Timestamp,
}

/// Public profile looked up by username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub total_chats: i64,
}

/// Minimal user projection embedded in chats and messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// One-to-one chat between two users.
///
/// `user1.id < user2.id` always holds (see [`super::ChatPair`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub user1: UserSummary,
    pub user2: UserSummary,
    pub created_at: Timestamp,
}

impl Chat {
    /// Whether `user` is one of the two participants
    pub fn has_participant(&self, user: UserId) -> bool {
        self.user1.id == user || self.user2.id == user
    }

    /// Both participant ids, smaller first
    pub fn participants(&self) -> [UserId; 2] {
        [self.user1.id, self.user2.id]
    }
}

/// Most recent message of a chat, shown in chat lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestMessage {
    pub message_text: Option<String>,
    pub created_at: Timestamp,
    pub sender_id: UserId,
}

/// Chat list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub chat: Chat,
    pub latest_message: Option<LatestMessage>,
}

/// Stored chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender: UserSummary,
    pub message_text: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub is_deleted: bool,
}

impl Message {
    /// Sender's user id
    pub fn sender_id(&self) -> UserId {
        self.sender.id
    }

    /// Apply the soft-delete transformation: sentinel text, no image.
    pub fn mark_deleted(&mut self) {
        self.message_text = Some(DELETED_MESSAGE_NOTICE.to_string());
        self.image_url = None;
        self.is_deleted = true;
    }
}

/// Insert payload for a new message.
///
/// Construction enforces that at least one of text and image is present.
#[derive(Debug, Clone)]
pub struct NewMessage {
    chat_id: ChatId,
    sender_id: UserId,
    text: Option<MessageText>,
    image_url: Option<String>,
    created_at: Timestamp,
}

impl NewMessage {
    /// Build a new message.
    ///
    /// # Errors
    ///
    /// Returns `MessageError::Empty` if both text and image are absent
    pub fn new(
        chat_id: ChatId,
        sender_id: UserId,
        text: Option<MessageText>,
        image_url: Option<String>,
        created_at: Timestamp,
    ) -> Result<Self, MessageError> {
        if text.is_none() && image_url.is_none() {
            return Err(MessageError::Empty);
        }
        Ok(Self {
            chat_id,
            sender_id,
            text,
            image_url,
            created_at,
        })
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn sender_id(&self) -> UserId {
        self.sender_id
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_ref().map(MessageText::as_str)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Pending email verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpVerification {
    pub email: Email,
    pub code: OtpCode,
    pub expires_at: Timestamp,
}

/// Chat activity handed from a durable write to the fan-out router.
///
/// Built after the store commit succeeds and consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A message was stored. `participants` are both chat members, so their
    /// other connections can refresh their chat lists.
    MessageCreated {
        message: Message,
        participants: [UserId; 2],
    },
    /// A message was soft-deleted.
    MessageDeleted {
        chat_id: ChatId,
        message_id: MessageId,
    },
}

impl ChatEvent {
    /// Chat the event belongs to
    pub fn chat_id(&self) -> ChatId {
        match self {
            ChatEvent::MessageCreated { message, .. } => message.chat_id,
            ChatEvent::MessageDeleted { chat_id, .. } => *chat_id,
        }
    }
}
