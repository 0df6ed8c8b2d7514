//! UseCase: 参加者切断処理
//!
//! 接続の登録・ルーム参加・在席カウントを一度に片付ける。
//! 最後の接続が切れたユーザーはオフラインになり、全接続に一覧が再配信される。

use std::sync::Arc;

use crate::{
    domain::ConnectionId,
    realtime::{Departure, RealtimeHub},
};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    hub: Arc<RealtimeHub>,
}

impl DisconnectParticipantUseCase {
    pub fn new(hub: Arc<RealtimeHub>) -> Self {
        Self { hub }
    }

    /// # Returns
    ///
    /// * `Some(Departure)` - 切断した接続の後始末の結果
    /// * `None` - 既に切断済み
    pub async fn execute(&self, connection: ConnectionId) -> Option<Departure> {
        let departure = self.hub.disconnect(&connection).await;
        if let Some(departure) = &departure
            && departure.went_offline
            && let Some(user_id) = departure.user_id
        {
            tracing::info!("User {} is now offline", user_id);
        }
        departure
    }
}
