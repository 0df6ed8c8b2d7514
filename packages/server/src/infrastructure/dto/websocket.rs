//! WebSocket message DTOs for the chat application.
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<kebab-case name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

use super::http::MessageDto;

/// Reference to a stored message, as carried by `send-message`.
///
/// Clients send the whole message object they got back from the REST call;
/// only the identifiers are read, the rest comes from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: i64,
    pub chat_id: i64,
}

/// `{chatId, messageId}` payload shared by the delete events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeletedPayload {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Welcome payload telling a client its own connection id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub connection_id: String,
}

/// Events a client may send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Bind this connection to a user id
    UserOnline(i64),
    /// Subscribe to a chat room
    JoinChat(i64),
    /// Unsubscribe from a chat room
    LeaveChat(i64),
    /// Ask the server to relay a message the client just stored over REST
    SendMessage(MessageRef),
    /// Ask the server to relay a deletion the client just performed over REST
    DeleteMessage(MessageDeletedPayload),
}

impl ClientEvent {
    /// Event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::UserOnline(_) => "user-online",
            ClientEvent::JoinChat(_) => "join-chat",
            ClientEvent::LeaveChat(_) => "leave-chat",
            ClientEvent::SendMessage(_) => "send-message",
            ClientEvent::DeleteMessage(_) => "delete-message",
        }
    }
}

/// Events the server pushes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// First frame on every connection
    Connected(ConnectedPayload),
    /// Full snapshot of online user ids, broadcast to everyone
    OnlineUsers(Vec<i64>),
    /// A message was created in a chat
    NewMessage(MessageDto),
    /// A message was deleted in a chat
    MessageDeleted(MessageDeletedPayload),
}
