//! UseCase: プッシュチャネルへの接続と在席通知
//!
//! ## テスト観点
//!
//! - 正常系：接続すると接続 ID が払い出され、user-online で在席になる
//! - 異常系：存在しないユーザーとしての在席通知
//! - エッジケース：同じ接続からの別ユーザーとしての再通知

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    domain::{ConnectionId, UserId, UserRepository},
    realtime::{AnnounceOutcome, RealtimeHub},
};

use super::error::UseCaseError;

/// 接続のユースケース
pub struct ConnectParticipantUseCase {
    hub: Arc<RealtimeHub>,
}

impl ConnectParticipantUseCase {
    pub fn new(hub: Arc<RealtimeHub>) -> Self {
        Self { hub }
    }

    /// 匿名の接続を登録し、`sender` に connected イベントを送る
    pub async fn execute(&self, sender: UnboundedSender<String>) -> ConnectionId {
        self.hub.connect(sender).await
    }
}

/// 在席通知（user-online）のユースケース
pub struct AnnouncePresenceUseCase {
    users: Arc<dyn UserRepository>,
    hub: Arc<RealtimeHub>,
}

impl AnnouncePresenceUseCase {
    pub fn new(users: Arc<dyn UserRepository>, hub: Arc<RealtimeHub>) -> Self {
        Self { users, hub }
    }

    /// 接続にユーザーを結び付ける。ユーザーは実在すること
    pub async fn execute(
        &self,
        connection: ConnectionId,
        user_id: i64,
    ) -> Result<AnnounceOutcome, UseCaseError> {
        let user_id = UserId::new(user_id);
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(UseCaseError::Auth("Invalid user".to_string()));
        }
        Ok(self.hub.announce(&connection, user_id).await)
    }
}
