//! UseCase: メッセージ送信処理
//!
//! ## テスト観点
//!
//! - 正常系：保存したメッセージがチャットのルームと参加者の接続に配信される
//! - 異常系：本文も画像もない、参加していないチャット
//! - エッジケース：空文字の本文は「本文なし」として扱う

use std::sync::Arc;

use crate::{
    domain::{
        ChatEvent, ChatId, ChatRepository, ImageStore, Message, MessageError, MessageRepository,
        MessageText, NewMessage, Timestamp, UserId,
    },
    realtime::RealtimeHub,
};

use super::error::UseCaseError;

/// アップロードされた画像
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// メッセージ送信の入力
#[derive(Debug, Clone)]
pub struct SendMessageInput {
    pub chat_id: ChatId,
    pub sender: UserId,
    pub text: Option<String>,
    pub image: Option<ImageUpload>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    images: Arc<dyn ImageStore>,
    hub: Arc<RealtimeHub>,
}

impl SendMessageUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        images: Arc<dyn ImageStore>,
        hub: Arc<RealtimeHub>,
    ) -> Self {
        Self {
            chats,
            messages,
            images,
            hub,
        }
    }

    /// メッセージを保存し、購読中の接続へ配信する
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 保存したメッセージ（送信者情報付き）
    /// * `Err(UseCaseError)` - 入力不正、チャットが見つからない、保存失敗
    pub async fn execute(&self, input: SendMessageInput) -> Result<Message, UseCaseError> {
        let chat = self
            .chats
            .find_for_participant(input.chat_id, input.sender)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Chat not found"))?;

        let text = MessageText::from_optional(input.text)?;
        let image = input.image.filter(|image| !image.bytes.is_empty());
        if text.is_none() && image.is_none() {
            return Err(MessageError::Empty.into());
        }

        // 1. 画像を保存
        let image_url = match image {
            Some(image) => Some(self.images.save(image.bytes, &image.content_type).await?),
            None => None,
        };

        // 2. メッセージを保存（失敗したら画像を片付ける）
        let new_message = NewMessage::new(
            chat.id,
            input.sender,
            text,
            image_url.clone(),
            Timestamp::now(),
        )?;
        let message = match self.messages.create(new_message).await {
            Ok(message) => message,
            Err(e) => {
                if let Some(url) = image_url
                    && let Err(cleanup) = self.images.remove(&url).await
                {
                    tracing::warn!("Failed to remove orphaned image '{}': {}", url, cleanup);
                }
                return Err(e.into());
            }
        };

        // 3. 配信
        let delivered = self
            .hub
            .publish(
                &ChatEvent::MessageCreated {
                    message: message.clone(),
                    participants: chat.participants(),
                },
                None,
            )
            .await;
        tracing::info!(
            "Message {} stored in chat {} and delivered to {} connection(s)",
            message.id,
            chat.id,
            delivered
        );

        Ok(message)
    }
}
