//! Event fan-out for the push channel.
//!
//! `RealtimeHub` owns the connection registry, presence tracker and room
//! membership behind a single lock. Every operation runs to completion inside
//! that lock and only performs non-blocking channel sends, so events for a
//! chat reach each connection in the order the hub processed them.

use std::collections::HashSet;

use tokio::sync::{Mutex, mpsc::UnboundedSender};

use crate::{
    domain::{ChatEvent, ChatId, ConnectionId, ConnectionIdFactory, Timestamp, UserId},
    infrastructure::dto::{
        http::MessageDto,
        websocket::{ConnectedPayload, MessageDeletedPayload, ServerEvent},
    },
};

use super::{
    membership::RoomMembership,
    presence::{OfflineTransition, PresenceTracker},
    registry::{AnnounceOutcome, ConnectionRegistry},
};

/// What `disconnect` tore down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// User bound to the connection, if it had announced
    pub user_id: Option<UserId>,
    /// The user's last connection closed
    pub went_offline: bool,
    /// Rooms the connection was removed from
    pub rooms_left: usize,
    /// Connections the user still has open
    pub remaining_connections: usize,
    /// How long the connection was registered
    pub connected_for_millis: i64,
}

/// Point-in-time view of the hub for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubStats {
    pub online_users: Vec<UserId>,
    pub connections: usize,
    pub rooms: usize,
}

#[derive(Debug, Default)]
struct HubState {
    registry: ConnectionRegistry,
    presence: PresenceTracker,
    rooms: RoomMembership,
}

impl HubState {
    fn send_to(&self, id: &ConnectionId, frame: &str) -> bool {
        match self.registry.get(id) {
            Some(connection) => {
                let delivered = connection.send(frame.to_string());
                if !delivered {
                    tracing::warn!("Failed to queue frame for connection '{}'", id);
                }
                delivered
            }
            None => false,
        }
    }

    fn broadcast(&self, frame: &str) -> usize {
        self.registry
            .connection_ids()
            .iter()
            .filter(|id| self.send_to(id, frame))
            .count()
    }

    fn online_users_frame(&self) -> Option<String> {
        let users = self
            .presence
            .online_users()
            .into_iter()
            .map(|id| id.value())
            .collect();
        encode(&ServerEvent::OnlineUsers(users))
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!("Failed to serialize push event: {}", e);
            None
        }
    }
}

/// Process-wide push-channel state
#[derive(Debug, Default)]
pub struct RealtimeHub {
    state: Mutex<HubState>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new anonymous connection and greet it with its id.
    pub async fn connect(&self, sender: UnboundedSender<String>) -> ConnectionId {
        let mut state = self.state.lock().await;
        let mut id = ConnectionIdFactory::generate();
        while !state.registry.register(id, sender.clone(), Timestamp::now()) {
            id = ConnectionIdFactory::generate();
        }

        let welcome = ServerEvent::Connected(ConnectedPayload {
            connection_id: id.to_string(),
        });
        if let Some(frame) = encode(&welcome) {
            state.send_to(&id, &frame);
        }
        tracing::info!(
            "Connection '{}' registered ({} live)",
            id,
            state.registry.len()
        );
        id
    }

    /// Bind a user to the connection and refresh everyone's online list.
    pub async fn announce(&self, connection: &ConnectionId, user_id: UserId) -> AnnounceOutcome {
        let mut state = self.state.lock().await;
        let outcome = state.registry.announce(connection, user_id);
        match outcome {
            AnnounceOutcome::Bound => {
                state.presence.mark_online(user_id);
                if let Some(frame) = state.online_users_frame() {
                    state.broadcast(&frame);
                }
                tracing::info!("User {} online via connection '{}'", user_id, connection);
            }
            AnnounceOutcome::AlreadyBound => {
                if let Some(frame) = state.online_users_frame() {
                    state.send_to(connection, &frame);
                }
            }
            AnnounceOutcome::Rejected { bound_to } => {
                tracing::warn!(
                    "Connection '{}' is bound to user {}; ignoring announce as user {}",
                    connection,
                    bound_to,
                    user_id
                );
            }
            AnnounceOutcome::UnknownConnection => {
                tracing::warn!("Announce for unknown connection '{}'", connection);
            }
        }
        outcome
    }

    /// Subscribe the connection to a chat room. `false` if unknown or already a member.
    pub async fn join(&self, connection: &ConnectionId, chat_id: ChatId) -> bool {
        let mut state = self.state.lock().await;
        if !state.registry.contains(connection) {
            tracing::warn!("Join for unknown connection '{}'", connection);
            return false;
        }
        if state.rooms.is_member(connection, chat_id) {
            return false;
        }
        state.registry.add_room(connection, chat_id);
        state.rooms.join(*connection, chat_id);
        tracing::debug!("Connection '{}' joined chat {}", connection, chat_id);
        true
    }

    /// Unsubscribe the connection from a chat room. `false` if it was not a member.
    pub async fn leave(&self, connection: &ConnectionId, chat_id: ChatId) -> bool {
        let mut state = self.state.lock().await;
        if !state.registry.remove_room(connection, chat_id) {
            return false;
        }
        state.rooms.leave(connection, chat_id);
        tracing::debug!("Connection '{}' left chat {}", connection, chat_id);
        true
    }

    /// Tear the connection down: registry, rooms and presence in one step.
    pub async fn disconnect(&self, connection: &ConnectionId) -> Option<Departure> {
        let mut state = self.state.lock().await;
        let entry = state.registry.unregister(connection)?;

        let rooms: Vec<ChatId> = entry.rooms().copied().collect();
        state.rooms.drop_connection(connection, &rooms);

        let (went_offline, remaining_connections) = match entry.user_id() {
            Some(user_id) => (
                state.presence.mark_offline(user_id) == OfflineTransition::WentOffline,
                state.presence.connection_count(user_id),
            ),
            None => (false, 0),
        };
        if went_offline && let Some(frame) = state.online_users_frame() {
            state.broadcast(&frame);
        }

        let connected_for_millis = Timestamp::now()
            .value()
            .saturating_sub(entry.connected_at().value())
            .max(0);
        tracing::info!(
            "Connection '{}' removed after {} ms ({} live, {} active rooms)",
            connection,
            connected_for_millis,
            state.registry.len(),
            state.rooms.room_count()
        );
        Some(Departure {
            user_id: entry.user_id(),
            went_offline,
            rooms_left: rooms.len(),
            remaining_connections,
            connected_for_millis,
        })
    }

    /// Deliver a chat event to its subscribers. `origin`, when given, never
    /// receives the event. Returns the number of connections reached.
    pub async fn publish(&self, event: &ChatEvent, origin: Option<ConnectionId>) -> usize {
        let state = self.state.lock().await;

        let (frame, mut targets) = match event {
            ChatEvent::MessageCreated {
                message,
                participants,
            } => {
                let mut targets: HashSet<ConnectionId> =
                    state.rooms.members_of(message.chat_id).into_iter().collect();
                for participant in participants {
                    targets.extend(state.registry.connections_of_user(*participant));
                }
                (
                    encode(&ServerEvent::NewMessage(MessageDto::from(message))),
                    targets,
                )
            }
            ChatEvent::MessageDeleted {
                chat_id,
                message_id,
            } => (
                encode(&ServerEvent::MessageDeleted(MessageDeletedPayload {
                    chat_id: chat_id.value(),
                    message_id: message_id.value(),
                })),
                state.rooms.members_of(*chat_id).into_iter().collect(),
            ),
        };
        let Some(frame) = frame else {
            return 0;
        };
        if let Some(origin) = origin {
            targets.remove(&origin);
        }

        let delivered = targets.iter().filter(|id| state.send_to(id, &frame)).count();
        tracing::debug!(
            "Published event for chat {} to {} connection(s)",
            event.chat_id(),
            delivered
        );
        delivered
    }

    pub async fn user_of(&self, connection: &ConnectionId) -> Option<UserId> {
        self.state.lock().await.registry.user_of(connection)
    }

    pub async fn is_online(&self, user_id: UserId) -> bool {
        self.state.lock().await.presence.is_online(user_id)
    }

    pub async fn online_users(&self) -> Vec<UserId> {
        self.state.lock().await.presence.online_users()
    }

    pub async fn members_of(&self, chat_id: ChatId) -> Vec<ConnectionId> {
        self.state.lock().await.rooms.members_of(chat_id)
    }

    /// Number of live connections
    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    pub async fn stats(&self) -> HubStats {
        let state = self.state.lock().await;
        HubStats {
            online_users: state.presence.online_users(),
            connections: state.registry.len(),
            rooms: state.rooms.room_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, MessageId, UserSummary};
    use serde_json::Value;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    async fn open(hub: &RealtimeHub) -> (ConnectionId, UnboundedReceiver<String>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.connect(tx).await;
        // connected フレームを読み捨てる
        let welcome: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(welcome["event"], "connected");
        (id, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    fn message(id: i64, chat_id: i64, sender: i64) -> Message {
        Message {
            id: MessageId::new(id),
            chat_id: ChatId::new(chat_id),
            sender: UserSummary {
                id: UserId::new(sender),
                username: format!("user{sender}"),
                first_name: "First".to_string(),
                last_name: "Last".to_string(),
            },
            message_text: Some("hi".to_string()),
            image_url: None,
            created_at: Timestamp::new(1_700_000_000_000),
            is_deleted: false,
        }
    }

    #[tokio::test]
    async fn test_connect_sends_connection_id() {
        // テスト項目: 接続直後に自分の接続 ID を含む connected イベントが届く
        // given (前提条件):
        let hub = RealtimeHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        let id = hub.connect(tx).await;

        // then (期待する結果):
        let frame: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame["event"], "connected");
        assert_eq!(frame["data"]["connectionId"], id.to_string());
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_announce_broadcasts_online_users_to_everyone() {
        // テスト項目: user-online で全接続にオンライン一覧が配信される
        // given (前提条件):
        let hub = RealtimeHub::new();
        let (a, mut rx_a) = open(&hub).await;
        let (_b, mut rx_b) = open(&hub).await;

        // when (操作):
        let outcome = hub.announce(&a, UserId::new(7)).await;

        // then (期待する結果):
        assert_eq!(outcome, AnnounceOutcome::Bound);
        let expected = serde_json::json!({"event": "online-users", "data": [7]});
        assert_eq!(drain(&mut rx_a), vec![expected.clone()]);
        assert_eq!(drain(&mut rx_b), vec![expected]);
        assert!(hub.is_online(UserId::new(7)).await);
    }

    #[tokio::test]
    async fn test_announce_with_other_user_is_rejected() {
        // テスト項目: 別ユーザー ID での再通知はバインドを変えない
        let hub = RealtimeHub::new();
        let (a, mut rx_a) = open(&hub).await;
        hub.announce(&a, UserId::new(1)).await;
        drain(&mut rx_a);

        let outcome = hub.announce(&a, UserId::new(2)).await;

        assert_eq!(
            outcome,
            AnnounceOutcome::Rejected {
                bound_to: UserId::new(1)
            }
        );
        assert_eq!(hub.user_of(&a).await, Some(UserId::new(1)));
        assert!(!hub.is_online(UserId::new(2)).await);
        assert!(drain(&mut rx_a).is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_last_connection_goes_offline() {
        // テスト項目: 最後の接続が切れるとオフラインになり一覧が再配信される
        // given (前提条件):
        let hub = RealtimeHub::new();
        let (a, _rx_a) = open(&hub).await;
        let (b, mut rx_b) = open(&hub).await;
        hub.announce(&a, UserId::new(1)).await;
        hub.announce(&b, UserId::new(2)).await;
        drain(&mut rx_b);

        // when (操作):
        let departure = hub.disconnect(&a).await.unwrap();

        // then (期待する結果):
        assert_eq!(departure.user_id, Some(UserId::new(1)));
        assert!(departure.went_offline);
        assert_eq!(
            drain(&mut rx_b),
            vec![serde_json::json!({"event": "online-users", "data": [2]})]
        );
        assert_eq!(hub.online_users().await, vec![UserId::new(2)]);
    }

    #[tokio::test]
    async fn test_disconnect_one_of_two_connections_stays_online() {
        // テスト項目: 同じユーザーの接続が残っている間はオンラインのまま、配信もしない
        let hub = RealtimeHub::new();
        let (a1, _rx_a1) = open(&hub).await;
        let (a2, mut rx_a2) = open(&hub).await;
        hub.announce(&a1, UserId::new(1)).await;
        hub.announce(&a2, UserId::new(1)).await;
        drain(&mut rx_a2);

        let departure = hub.disconnect(&a1).await.unwrap();

        assert!(!departure.went_offline);
        assert_eq!(departure.remaining_connections, 1);
        assert!(departure.connected_for_millis >= 0);
        assert!(hub.is_online(UserId::new(1)).await);
        assert!(drain(&mut rx_a2).is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_removes_connection_from_every_room() {
        // テスト項目: leave せずに切断しても全ルームから外れる
        // given (前提条件):
        let hub = RealtimeHub::new();
        let (a, _rx_a) = open(&hub).await;
        hub.join(&a, ChatId::new(10)).await;
        hub.join(&a, ChatId::new(11)).await;

        // when (操作):
        let departure = hub.disconnect(&a).await.unwrap();

        // then (期待する結果):
        assert_eq!(departure.rooms_left, 2);
        assert!(hub.members_of(ChatId::new(10)).await.is_empty());
        assert!(hub.members_of(ChatId::new(11)).await.is_empty());
        assert_eq!(hub.connection_count().await, 0);
        assert!(hub.disconnect(&a).await.is_none());
    }

    #[tokio::test]
    async fn test_join_and_leave() {
        // テスト項目: join / leave がメンバー一覧に反映され、重複はエラーにならない
        let hub = RealtimeHub::new();
        let (a, _rx_a) = open(&hub).await;

        assert!(hub.join(&a, ChatId::new(10)).await);
        assert!(!hub.join(&a, ChatId::new(10)).await);
        assert_eq!(hub.members_of(ChatId::new(10)).await, vec![a]);

        assert!(hub.leave(&a, ChatId::new(10)).await);
        assert!(!hub.leave(&a, ChatId::new(10)).await);
        assert!(hub.members_of(ChatId::new(10)).await.is_empty());
    }

    #[tokio::test]
    async fn test_join_with_unknown_connection_is_ignored() {
        // テスト項目: 切断済みの接続は join してもルームに入らない
        let hub = RealtimeHub::new();
        let (a, _rx_a) = open(&hub).await;
        hub.disconnect(&a).await;

        assert!(!hub.join(&a, ChatId::new(10)).await);
        assert!(hub.members_of(ChatId::new(10)).await.is_empty());
    }

    #[tokio::test]
    async fn test_stats_track_connections_rooms_and_presence() {
        // テスト項目: 統計に接続数・使用中のルーム数・オンラインユーザーが反映される
        // given (前提条件):
        let hub = RealtimeHub::new();
        let (a, _rx_a) = open(&hub).await;
        let (b, _rx_b) = open(&hub).await;
        hub.announce(&a, UserId::new(3)).await;
        hub.join(&a, ChatId::new(10)).await;
        hub.join(&b, ChatId::new(10)).await;
        hub.join(&b, ChatId::new(11)).await;

        // when (操作):
        let before = hub.stats().await;
        let departure = hub.disconnect(&b).await.unwrap();
        let after = hub.stats().await;

        // then (期待する結果):
        assert_eq!(
            before,
            HubStats {
                online_users: vec![UserId::new(3)],
                connections: 2,
                rooms: 2,
            }
        );
        assert_eq!(departure.user_id, None);
        assert_eq!(departure.remaining_connections, 0);
        assert_eq!(
            after,
            HubStats {
                online_users: vec![UserId::new(3)],
                connections: 1,
                rooms: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_publish_message_created_reaches_room_and_participants() {
        // テスト項目: new-message はルームのメンバーと参加者の全接続に届き、無関係な接続には届かない
        // given (前提条件):
        let hub = RealtimeHub::new();
        let (in_room, mut rx_in_room) = open(&hub).await;
        let (other_tab, mut rx_other_tab) = open(&hub).await;
        let (stranger, mut rx_stranger) = open(&hub).await;
        hub.announce(&in_room, UserId::new(1)).await;
        hub.announce(&other_tab, UserId::new(2)).await;
        hub.announce(&stranger, UserId::new(3)).await;
        hub.join(&in_room, ChatId::new(10)).await;
        drain(&mut rx_in_room);
        drain(&mut rx_other_tab);
        drain(&mut rx_stranger);

        let event = ChatEvent::MessageCreated {
            message: message(5, 10, 1),
            participants: [UserId::new(1), UserId::new(2)],
        };

        // when (操作):
        let delivered = hub.publish(&event, None).await;

        // then (期待する結果):
        assert_eq!(delivered, 2);
        let frames = drain(&mut rx_in_room);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["event"], "new-message");
        assert_eq!(frames[0]["data"]["id"], 5);
        assert_eq!(frames[0]["data"]["message_text"], "hi");
        assert_eq!(drain(&mut rx_other_tab).len(), 1);
        assert!(drain(&mut rx_stranger).is_empty());
    }

    #[tokio::test]
    async fn test_publish_message_deleted_excludes_origin() {
        // テスト項目: message-deleted はルームのメンバーのうち削除元以外に届く
        // given (前提条件):
        let hub = RealtimeHub::new();
        let (origin, mut rx_origin) = open(&hub).await;
        let (peer, mut rx_peer) = open(&hub).await;
        let (outside, mut rx_outside) = open(&hub).await;
        hub.join(&origin, ChatId::new(10)).await;
        hub.join(&peer, ChatId::new(10)).await;
        hub.join(&outside, ChatId::new(11)).await;

        let event = ChatEvent::MessageDeleted {
            chat_id: ChatId::new(10),
            message_id: MessageId::new(5),
        };

        // when (操作):
        let delivered = hub.publish(&event, Some(origin)).await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert!(drain(&mut rx_origin).is_empty());
        assert_eq!(
            drain(&mut rx_peer),
            vec![serde_json::json!({"event": "message-deleted", "data": {"chatId": 10, "messageId": 5}})]
        );
        assert!(drain(&mut rx_outside).is_empty());
    }

    #[tokio::test]
    async fn test_publish_preserves_order_per_connection() {
        // テスト項目: 同じチャットのイベントは処理順に届く
        let hub = RealtimeHub::new();
        let (a, mut rx_a) = open(&hub).await;
        hub.join(&a, ChatId::new(10)).await;

        for id in 1..=3 {
            let event = ChatEvent::MessageCreated {
                message: message(id, 10, 1),
                participants: [UserId::new(1), UserId::new(2)],
            };
            hub.publish(&event, None).await;
        }
        hub.publish(
            &ChatEvent::MessageDeleted {
                chat_id: ChatId::new(10),
                message_id: MessageId::new(2),
            },
            None,
        )
        .await;

        let events: Vec<(String, i64)> = drain(&mut rx_a)
            .into_iter()
            .map(|frame| {
                let id = frame["data"]["id"]
                    .as_i64()
                    .or_else(|| frame["data"]["messageId"].as_i64())
                    .unwrap();
                (frame["event"].as_str().unwrap().to_string(), id)
            })
            .collect();
        assert_eq!(
            events,
            vec![
                ("new-message".to_string(), 1),
                ("new-message".to_string(), 2),
                ("new-message".to_string(), 3),
                ("message-deleted".to_string(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_skips_closed_receivers() {
        // テスト項目: 受信側が閉じた接続はスキップされる
        let hub = RealtimeHub::new();
        let (a, rx_a) = open(&hub).await;
        hub.join(&a, ChatId::new(10)).await;
        drop(rx_a);

        let delivered = hub
            .publish(
                &ChatEvent::MessageDeleted {
                    chat_id: ChatId::new(10),
                    message_id: MessageId::new(1),
                },
                None,
            )
            .await;

        assert_eq!(delivered, 0);
    }
}
