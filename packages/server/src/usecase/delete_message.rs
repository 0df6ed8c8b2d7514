//! UseCase: メッセージ削除処理
//!
//! 削除は常に論理削除で、送信者本人だけが行える。
//! 2 回目以降の削除は何も変えず、再配信もしない。

use std::sync::Arc;

use crate::{
    domain::{
        ChatEvent, ChatId, ConnectionId, ImageStore, Message, MessageId, MessageRepository,
        UserId,
    },
    realtime::RealtimeHub,
};

use super::error::UseCaseError;

/// メッセージ削除のユースケース
pub struct DeleteMessageUseCase {
    messages: Arc<dyn MessageRepository>,
    images: Arc<dyn ImageStore>,
    hub: Arc<RealtimeHub>,
}

impl DeleteMessageUseCase {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        images: Arc<dyn ImageStore>,
        hub: Arc<RealtimeHub>,
    ) -> Self {
        Self {
            messages,
            images,
            hub,
        }
    }

    /// # Arguments
    ///
    /// * `origin` - 削除を行った接続。配信対象から外す
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 削除後の状態のメッセージ
    /// * `Err(UseCaseError::NotFound)` - 存在しない、別チャットのもの、または送信者本人でない
    pub async fn execute(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        requester: UserId,
        origin: Option<ConnectionId>,
    ) -> Result<Message, UseCaseError> {
        let mut message = self
            .messages
            .find_by_id(message_id)
            .await?
            .filter(|m| m.chat_id == chat_id && m.sender_id() == requester)
            .ok_or_else(|| UseCaseError::not_found("Message not found"))?;

        if message.is_deleted {
            return Ok(message);
        }
        if !self.messages.mark_deleted(message.id).await? {
            // 並行した削除に先を越された
            message.mark_deleted();
            return Ok(message);
        }

        if let Some(url) = message.image_url.as_deref()
            && let Err(e) = self.images.remove(url).await
        {
            tracing::warn!("Failed to remove image '{}' of message {}: {}", url, message.id, e);
        }
        message.mark_deleted();

        let delivered = self
            .hub
            .publish(
                &ChatEvent::MessageDeleted {
                    chat_id,
                    message_id: message.id,
                },
                origin,
            )
            .await;
        tracing::info!(
            "Message {} deleted in chat {}; notified {} connection(s)",
            message.id,
            chat_id,
            delivered
        );

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DELETED_MESSAGE_NOTICE, gateway::MockImageStore, repository::MockMessageRepository},
        usecase::test_support::message,
    };
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_delete_message_soft_deletes_and_notifies_room() {
        // テスト項目: 送信者が削除すると定型文に置き換わり、削除元以外のルーム参加者に通知される
        // given (前提条件):
        let hub = Arc::new(RealtimeHub::new());
        let (origin_tx, mut origin_rx) = mpsc::unbounded_channel();
        let (peer_tx, mut peer_rx) = mpsc::unbounded_channel();
        let origin = hub.connect(origin_tx).await;
        let peer = hub.connect(peer_tx).await;
        hub.join(&origin, ChatId::new(10)).await;
        hub.join(&peer, ChatId::new(10)).await;
        origin_rx.try_recv().unwrap();
        peer_rx.try_recv().unwrap();

        let mut messages = MockMessageRepository::new();
        messages.expect_find_by_id().returning(|_| {
            let mut stored = message(5, 10, 1);
            stored.image_url = Some("/uploads/a.png".to_string());
            Ok(Some(stored))
        });
        messages.expect_mark_deleted().times(1).returning(|_| Ok(true));
        let mut images = MockImageStore::new();
        images
            .expect_remove()
            .withf(|url| url == "/uploads/a.png")
            .times(1)
            .returning(|_| Ok(()));
        let usecase = DeleteMessageUseCase::new(Arc::new(messages), Arc::new(images), hub);

        // when (操作):
        let deleted = usecase
            .execute(ChatId::new(10), MessageId::new(5), UserId::new(1), Some(origin))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(deleted.is_deleted);
        assert_eq!(deleted.message_text.as_deref(), Some(DELETED_MESSAGE_NOTICE));
        assert_eq!(deleted.image_url, None);
        assert!(origin_rx.try_recv().is_err());
        let frame: serde_json::Value = serde_json::from_str(&peer_rx.try_recv().unwrap()).unwrap();
        assert_eq!(
            frame,
            serde_json::json!({"event": "message-deleted", "data": {"chatId": 10, "messageId": 5}})
        );
    }

    #[tokio::test]
    async fn test_delete_message_twice_is_idempotent() {
        // テスト項目: 削除済みのメッセージを再度削除しても何も変わらず、再配信もない
        // given (前提条件):
        let hub = Arc::new(RealtimeHub::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = hub.connect(tx).await;
        hub.join(&connection, ChatId::new(10)).await;
        rx.try_recv().unwrap();

        let mut messages = MockMessageRepository::new();
        messages.expect_find_by_id().returning(|_| {
            let mut stored = message(5, 10, 1);
            stored.mark_deleted();
            Ok(Some(stored))
        });
        messages.expect_mark_deleted().never();
        let usecase =
            DeleteMessageUseCase::new(Arc::new(messages), Arc::new(MockImageStore::new()), hub);

        // when (操作):
        let result = usecase
            .execute(ChatId::new(10), MessageId::new(5), UserId::new(1), None)
            .await;

        // then (期待する結果):
        assert!(result.unwrap().is_deleted);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_message_by_non_sender_is_not_found() {
        // テスト項目: 送信者以外・別チャット・存在しないメッセージはいずれも NotFound
        let mut messages = MockMessageRepository::new();
        messages
            .expect_find_by_id()
            .returning(|id| match id.value() {
                5 => Ok(Some(message(5, 10, 1))),
                _ => Ok(None),
            });
        messages.expect_mark_deleted().never();
        let usecase = DeleteMessageUseCase::new(
            Arc::new(messages),
            Arc::new(MockImageStore::new()),
            Arc::new(RealtimeHub::new()),
        );
        let expected = UseCaseError::not_found("Message not found");

        let not_sender = usecase
            .execute(ChatId::new(10), MessageId::new(5), UserId::new(2), None)
            .await;
        let other_chat = usecase
            .execute(ChatId::new(11), MessageId::new(5), UserId::new(1), None)
            .await;
        let missing = usecase
            .execute(ChatId::new(10), MessageId::new(6), UserId::new(1), None)
            .await;

        assert_eq!(not_sender.unwrap_err(), expected);
        assert_eq!(other_chat.unwrap_err(), expected);
        assert_eq!(missing.unwrap_err(), expected);
    }
}
