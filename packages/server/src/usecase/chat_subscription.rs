//! UseCase: チャットルームの購読（join-chat / leave-chat）

use std::sync::Arc;

use crate::{
    domain::{ChatId, ChatRepository, ConnectionId},
    realtime::RealtimeHub,
};

use super::error::UseCaseError;

/// ルーム購読のユースケース
pub struct ChatSubscriptionUseCase {
    chats: Arc<dyn ChatRepository>,
    hub: Arc<RealtimeHub>,
}

impl ChatSubscriptionUseCase {
    pub fn new(chats: Arc<dyn ChatRepository>, hub: Arc<RealtimeHub>) -> Self {
        Self { chats, hub }
    }

    /// 在席通知済みの接続で、そのユーザーがチャットの参加者である場合だけ購読する
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 新たに購読した
    /// * `Ok(false)` - 既に購読済み
    pub async fn join(
        &self,
        connection: ConnectionId,
        chat_id: i64,
    ) -> Result<bool, UseCaseError> {
        let chat_id = ChatId::new(chat_id);
        let user = self
            .hub
            .user_of(&connection)
            .await
            .ok_or_else(|| UseCaseError::Auth("Connection has not announced a user".to_string()))?;
        if self.chats.find_for_participant(chat_id, user).await?.is_none() {
            return Err(UseCaseError::not_found("Chat not found"));
        }
        Ok(self.hub.join(&connection, chat_id).await)
    }

    /// 購読をやめる。購読していなくてもエラーにしない
    pub async fn leave(&self, connection: ConnectionId, chat_id: i64) -> bool {
        self.hub.leave(&connection, ChatId::new(chat_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{UserId, repository::MockChatRepository},
        usecase::test_support::chat,
    };
    use tokio::sync::mpsc;

    fn chats_of_user_1() -> MockChatRepository {
        let mut chats = MockChatRepository::new();
        chats
            .expect_find_for_participant()
            .returning(|chat_id, user| match user.value() {
                1 => Ok(Some(chat(chat_id.value(), 1, 2))),
                _ => Ok(None),
            });
        chats
    }

    async fn announced(hub: &RealtimeHub, user: i64) -> ConnectionId {
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection = hub.connect(tx).await;
        hub.announce(&connection, UserId::new(user)).await;
        connection
    }

    #[tokio::test]
    async fn test_join_as_participant() {
        // テスト項目: 参加者はルームを購読でき、重複 join は false
        // given (前提条件):
        let hub = Arc::new(RealtimeHub::new());
        let connection = announced(&hub, 1).await;
        let usecase = ChatSubscriptionUseCase::new(Arc::new(chats_of_user_1()), hub.clone());

        // when (操作):
        let first = usecase.join(connection, 10).await.unwrap();
        let again = usecase.join(connection, 10).await.unwrap();

        // then (期待する結果):
        assert!(first);
        assert!(!again);
        assert_eq!(hub.members_of(ChatId::new(10)).await, vec![connection]);
    }

    #[tokio::test]
    async fn test_join_requires_announced_participant() {
        // テスト項目: 在席通知前・参加者以外の join は拒否される
        let hub = Arc::new(RealtimeHub::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let anonymous = hub.connect(tx).await;
        let outsider = announced(&hub, 3).await;
        let usecase = ChatSubscriptionUseCase::new(Arc::new(chats_of_user_1()), hub.clone());

        assert!(matches!(
            usecase.join(anonymous, 10).await.unwrap_err(),
            UseCaseError::Auth(_)
        ));
        assert_eq!(
            usecase.join(outsider, 10).await.unwrap_err(),
            UseCaseError::not_found("Chat not found")
        );
        assert!(hub.members_of(ChatId::new(10)).await.is_empty());
    }

    #[tokio::test]
    async fn test_leave() {
        // テスト項目: leave で購読が外れ、未購読の leave は false
        let hub = Arc::new(RealtimeHub::new());
        let connection = announced(&hub, 1).await;
        let usecase = ChatSubscriptionUseCase::new(Arc::new(chats_of_user_1()), hub.clone());
        usecase.join(connection, 10).await.unwrap();

        assert!(usecase.leave(connection, 10).await);
        assert!(!usecase.leave(connection, 10).await);
        assert!(hub.members_of(ChatId::new(10)).await.is_empty());
    }
}
