//! HTTP API request/response DTOs for the chat application.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Chat, ChatSummary, LatestMessage, Message, Profile, User, UserSummary,
};

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Public user fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// User entry in search results (no email)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSearchDto {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<&User> for UserSearchDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// User projection nested in chats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummaryDto {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&UserSummary> for UserSummaryDto {
    fn from(user: &UserSummary) -> Self {
        Self {
            id: user.id.value(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Chat with both participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDto {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub user1: UserSummaryDto,
    pub user2: UserSummaryDto,
    pub created_at: String, // RFC 3339
}

impl From<&Chat> for ChatDto {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id.value(),
            user1_id: chat.user1.id.value(),
            user2_id: chat.user2.id.value(),
            user1: UserSummaryDto::from(&chat.user1),
            user2: UserSummaryDto::from(&chat.user2),
            created_at: chat.created_at.to_rfc3339(),
        }
    }
}

/// Latest message preview in the chat list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestMessageDto {
    pub message_text: Option<String>,
    pub created_at: String, // RFC 3339
    pub sender_id: i64,
}

impl From<&LatestMessage> for LatestMessageDto {
    fn from(latest: &LatestMessage) -> Self {
        Self {
            message_text: latest.message_text.clone(),
            created_at: latest.created_at.to_rfc3339(),
            sender_id: latest.sender_id.value(),
        }
    }
}

/// Chat list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummaryDto {
    #[serde(flatten)]
    pub chat: ChatDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_message: Option<LatestMessageDto>,
}

impl From<&ChatSummary> for ChatSummaryDto {
    fn from(summary: &ChatSummary) -> Self {
        Self {
            chat: ChatDto::from(&summary.chat),
            latest_message: summary.latest_message.as_ref().map(LatestMessageDto::from),
        }
    }
}

/// Message with its sender's names.
///
/// Also the payload of the `new-message` push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub message_text: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String, // RFC 3339
    pub is_deleted: bool,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            chat_id: message.chat_id.value(),
            sender_id: message.sender.id.value(),
            message_text: message.message_text.clone(),
            image_url: message.image_url.clone(),
            created_at: message.created_at.to_rfc3339(),
            is_deleted: message.is_deleted,
            username: message.sender.username.clone(),
            first_name: message.sender.first_name.clone(),
            last_name: message.sender.last_name.clone(),
        }
    }
}

/// Public profile looked up by username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub username: String,
    pub profile_picture: Option<String>,
    pub total_chats: i64,
}

impl From<&Profile> for ProfileDto {
    fn from(profile: &Profile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            bio: profile.bio.clone(),
            username: profile.username.clone(),
            profile_picture: profile.profile_picture.clone(),
            total_chats: profile.total_chats,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSentResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOnlyResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserSearchDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatsResponse {
    pub chats: Vec<ChatSummaryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat: ChatDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDetailResponse {
    pub chat: ChatDto,
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: MessageDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMessageResponse {
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceResponse {
    pub online_users: Vec<i64>,
    pub connections: usize,
    pub rooms: usize,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Registration form. Every field is optional at the wire level so missing
/// fields produce a domain validation error rather than a parser rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreationRequest {
    pub email: Option<String>,
    pub entered_code: Option<String>,
    pub user_data: Option<RegisterRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOtpRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub user_id: Option<i64>,
    pub other_user_id: Option<i64>,
}

/// `?userId=` carried by most authenticated reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub username: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageQuery {
    pub user_id: Option<i64>,
    /// Push-channel connection that issued the delete; excluded from the fan-out
    pub connection_id: Option<String>,
}
