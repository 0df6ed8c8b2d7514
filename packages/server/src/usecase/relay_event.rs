//! UseCase: クライアントからの send-message / delete-message の中継
//!
//! クライアントが送ってきた内容はそのまま流さず、保存済みの状態を読み直して
//! 配信する。受け取った側はメッセージ ID で重複をまとめる。

use std::sync::Arc;

use crate::{
    domain::{
        ChatEvent, ChatId, ChatRepository, ConnectionId, Message, MessageId, MessageRepository,
        UserId,
    },
    realtime::RealtimeHub,
};

use super::error::UseCaseError;

/// 中継のユースケース
pub struct RelayEventUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    hub: Arc<RealtimeHub>,
}

impl RelayEventUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        hub: Arc<RealtimeHub>,
    ) -> Self {
        Self {
            chats,
            messages,
            hub,
        }
    }

    /// 保存済みのメッセージを new-message として再配信する
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 配信した接続数
    pub async fn relay_created(
        &self,
        connection: ConnectionId,
        chat_id: i64,
        message_id: i64,
    ) -> Result<usize, UseCaseError> {
        let (user, message) = self.own_message(connection, chat_id, message_id).await?;
        let chat = self
            .chats
            .find_for_participant(message.chat_id, user)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Chat not found"))?;

        Ok(self
            .hub
            .publish(
                &ChatEvent::MessageCreated {
                    message,
                    participants: chat.participants(),
                },
                None,
            )
            .await)
    }

    /// 削除済みのメッセージを message-deleted として再配信する（自分の接続は除く）
    pub async fn relay_deleted(
        &self,
        connection: ConnectionId,
        chat_id: i64,
        message_id: i64,
    ) -> Result<usize, UseCaseError> {
        let (_, message) = self.own_message(connection, chat_id, message_id).await?;
        if !message.is_deleted {
            return Err(UseCaseError::validation("Message has not been deleted"));
        }

        Ok(self
            .hub
            .publish(
                &ChatEvent::MessageDeleted {
                    chat_id: message.chat_id,
                    message_id: message.id,
                },
                Some(connection),
            )
            .await)
    }

    /// 接続のユーザーが送信した、指定チャットのメッセージ
    async fn own_message(
        &self,
        connection: ConnectionId,
        chat_id: i64,
        message_id: i64,
    ) -> Result<(UserId, Message), UseCaseError> {
        let user = self
            .hub
            .user_of(&connection)
            .await
            .ok_or_else(|| UseCaseError::Auth("Connection has not announced a user".to_string()))?;
        let message = self
            .messages
            .find_by_id(MessageId::new(message_id))
            .await?
            .filter(|m| m.chat_id == ChatId::new(chat_id) && m.sender_id() == user)
            .ok_or_else(|| UseCaseError::not_found("Message not found"))?;
        Ok((user, message))
    }
}
