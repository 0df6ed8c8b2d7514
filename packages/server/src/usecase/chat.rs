//! UseCase: チャットの作成・一覧・参照

use std::sync::Arc;

use crate::domain::{
    Chat, ChatId, ChatPair, ChatRepository, ChatSummary, Message, MessageRepository, Timestamp,
    UserId, UserRepository,
};

use super::error::UseCaseError;

/// 二者間チャットの取得または作成のユースケース
pub struct CreateChatUseCase {
    users: Arc<dyn UserRepository>,
    chats: Arc<dyn ChatRepository>,
}

impl CreateChatUseCase {
    pub fn new(users: Arc<dyn UserRepository>, chats: Arc<dyn ChatRepository>) -> Self {
        Self { users, chats }
    }

    /// `requester` と `other_user_id` のチャットを返す。なければ作成する
    ///
    /// どちら側から何度呼んでも同じチャットになる
    pub async fn execute(
        &self,
        requester: UserId,
        other_user_id: Option<i64>,
    ) -> Result<Chat, UseCaseError> {
        let other = other_user_id
            .map(UserId::new)
            .ok_or_else(|| UseCaseError::validation("Other user ID is required"))?;
        let pair = ChatPair::new(requester, other)?;

        if self.users.find_by_id(other).await?.is_none() {
            return Err(UseCaseError::not_found("User not found"));
        }

        let chat = self
            .chats
            .find_or_create(pair, Timestamp::now())
            .await
            .map_err(|e| match UseCaseError::from(e) {
                UseCaseError::NotFound(_) => UseCaseError::not_found("User not found"),
                other => other,
            })?;
        tracing::debug!("Chat {} between {} and {}", chat.id, chat.user1.id, chat.user2.id);
        Ok(chat)
    }
}

/// チャット一覧のユースケース
pub struct ListChatsUseCase {
    chats: Arc<dyn ChatRepository>,
}

impl ListChatsUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>) -> Self {
        Self { chats }
    }

    pub async fn execute(&self, user: UserId) -> Result<Vec<ChatSummary>, UseCaseError> {
        Ok(self.chats.list_for_user(user).await?)
    }
}

/// チャット詳細とメッセージ参照のユースケース
///
/// 参加者以外には存在しないチャットとして振る舞う
pub struct GetChatUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl GetChatUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { chats, messages }
    }

    /// チャットと作成順のメッセージ
    pub async fn execute(
        &self,
        chat_id: ChatId,
        user: UserId,
    ) -> Result<(Chat, Vec<Message>), UseCaseError> {
        let chat = self.find_chat(chat_id, user).await?;
        let messages = self.messages.list_for_chat(chat.id).await?;
        Ok((chat, messages))
    }

    /// メッセージのみ
    pub async fn messages(
        &self,
        chat_id: ChatId,
        user: UserId,
    ) -> Result<Vec<Message>, UseCaseError> {
        let chat = self.find_chat(chat_id, user).await?;
        Ok(self.messages.list_for_chat(chat.id).await?)
    }

    async fn find_chat(&self, chat_id: ChatId, user: UserId) -> Result<Chat, UseCaseError> {
        self.chats
            .find_for_participant(chat_id, user)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Chat not found"))
    }
}
