//! Connection Registry
//!
//! One entry per live push-channel connection. An entry starts anonymous and
//! is bound to a user id at most once, when the client announces itself.

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{ChatId, ConnectionId, Timestamp, UserId};

/// Registry entry for a live connection
#[derive(Debug)]
pub struct Connection {
    /// Set once by `announce`, never changed afterwards
    user_id: Option<UserId>,
    /// Rooms this connection has joined
    rooms: HashSet<ChatId>,
    /// Outbound frames for this connection's writer task
    sender: UnboundedSender<String>,
    /// Unix timestamp when connected (UTC, milliseconds)
    connected_at: Timestamp,
}

impl Connection {
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn rooms(&self) -> impl Iterator<Item = &ChatId> {
        self.rooms.iter()
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    /// Queue a frame. `false` if the writer side is gone.
    pub fn send(&self, frame: String) -> bool {
        self.sender.send(frame).is_ok()
    }
}

/// Result of binding a user id to a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceOutcome {
    /// First binding for this connection
    Bound,
    /// Same user id announced again; nothing changed
    AlreadyBound,
    /// A different user id was announced; the original binding is kept
    Rejected { bound_to: UserId },
    /// No such connection
    UnknownConnection,
}

/// Live connections keyed by connection id
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an anonymous connection. Returns `false` if the id is already registered.
    pub fn register(
        &mut self,
        id: ConnectionId,
        sender: UnboundedSender<String>,
        connected_at: Timestamp,
    ) -> bool {
        if self.connections.contains_key(&id) {
            return false;
        }
        self.connections.insert(
            id,
            Connection {
                user_id: None,
                rooms: HashSet::new(),
                sender,
                connected_at,
            },
        );
        true
    }

    /// Bind `user_id` to the connection, once.
    pub fn announce(&mut self, id: &ConnectionId, user_id: UserId) -> AnnounceOutcome {
        let Some(connection) = self.connections.get_mut(id) else {
            return AnnounceOutcome::UnknownConnection;
        };
        match connection.user_id {
            None => {
                connection.user_id = Some(user_id);
                AnnounceOutcome::Bound
            }
            Some(bound) if bound == user_id => AnnounceOutcome::AlreadyBound,
            Some(bound) => AnnounceOutcome::Rejected { bound_to: bound },
        }
    }

    /// Remove the connection and hand back its entry so the caller can
    /// release presence and room memberships.
    pub fn unregister(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn user_of(&self, id: &ConnectionId) -> Option<UserId> {
        self.connections.get(id).and_then(Connection::user_id)
    }

    /// Record that the connection joined `room`. `false` if unknown or already joined.
    pub fn add_room(&mut self, id: &ConnectionId, room: ChatId) -> bool {
        self.connections
            .get_mut(id)
            .is_some_and(|connection| connection.rooms.insert(room))
    }

    /// Record that the connection left `room`. `false` if unknown or not joined.
    pub fn remove_room(&mut self, id: &ConnectionId, room: ChatId) -> bool {
        self.connections
            .get_mut(id)
            .is_some_and(|connection| connection.rooms.remove(&room))
    }

    /// Connections bound to `user_id`
    pub fn connections_of_user(&self, user_id: UserId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|(_, connection)| connection.user_id == Some(user_id))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &Connection)> {
        self.connections.iter()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionIdFactory;
    use tokio::sync::mpsc;

    fn register_one(registry: &mut ConnectionRegistry) -> ConnectionId {
        let id = ConnectionIdFactory::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(registry.register(id, tx, Timestamp::new(1000)));
        id
    }

    #[test]
    fn test_register_creates_anonymous_entry() {
        // テスト項目: 登録直後の接続はユーザー未設定
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();

        // when (操作):
        let id = register_one(&mut registry);

        // then (期待する結果):
        assert!(registry.contains(&id));
        assert_eq!(registry.user_of(&id), None);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&id).unwrap().connected_at(), Timestamp::new(1000));
    }

    #[test]
    fn test_register_duplicate_id_is_rejected() {
        // テスト項目: 同じ接続 ID は二重登録できない
        let mut registry = ConnectionRegistry::new();
        let id = register_one(&mut registry);
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(!registry.register(id, tx, Timestamp::new(2000)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_announce_binds_user_once() {
        // テスト項目: ユーザー ID は一度だけ設定でき、別 ID での再通知は無視される
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        let id = register_one(&mut registry);

        // when (操作):
        let first = registry.announce(&id, UserId::new(1));
        let same = registry.announce(&id, UserId::new(1));
        let other = registry.announce(&id, UserId::new(2));

        // then (期待する結果):
        assert_eq!(first, AnnounceOutcome::Bound);
        assert_eq!(same, AnnounceOutcome::AlreadyBound);
        assert_eq!(
            other,
            AnnounceOutcome::Rejected {
                bound_to: UserId::new(1)
            }
        );
        assert_eq!(registry.user_of(&id), Some(UserId::new(1)));
    }

    #[test]
    fn test_announce_unknown_connection() {
        // テスト項目: 未登録の接続への通知は UnknownConnection
        let mut registry = ConnectionRegistry::new();

        let outcome = registry.announce(&ConnectionIdFactory::generate(), UserId::new(1));

        assert_eq!(outcome, AnnounceOutcome::UnknownConnection);
    }

    #[test]
    fn test_unregister_returns_entry_with_rooms() {
        // テスト項目: 登録解除すると参加中のルームを含むエントリが返される
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        let id = register_one(&mut registry);
        registry.announce(&id, UserId::new(1));
        registry.add_room(&id, ChatId::new(10));
        registry.add_room(&id, ChatId::new(11));

        // when (操作):
        let removed = registry.unregister(&id).unwrap();

        // then (期待する結果):
        let mut rooms: Vec<ChatId> = removed.rooms().copied().collect();
        rooms.sort();
        assert_eq!(rooms, vec![ChatId::new(10), ChatId::new(11)]);
        assert_eq!(removed.user_id(), Some(UserId::new(1)));
        assert!(registry.is_empty());
        assert!(registry.unregister(&id).is_none());
    }

    #[test]
    fn test_room_bookkeeping() {
        // テスト項目: ルームの参加・退出が重複や未参加でもエラーにならない
        let mut registry = ConnectionRegistry::new();
        let id = register_one(&mut registry);

        assert!(registry.add_room(&id, ChatId::new(10)));
        assert!(!registry.add_room(&id, ChatId::new(10)));
        assert!(registry.remove_room(&id, ChatId::new(10)));
        assert!(!registry.remove_room(&id, ChatId::new(10)));
        assert!(!registry.add_room(&ConnectionIdFactory::generate(), ChatId::new(10)));
    }

    #[test]
    fn test_connections_of_user() {
        // テスト項目: 同じユーザーの複数接続を列挙できる
        let mut registry = ConnectionRegistry::new();
        let a = register_one(&mut registry);
        let b = register_one(&mut registry);
        let c = register_one(&mut registry);
        registry.announce(&a, UserId::new(1));
        registry.announce(&b, UserId::new(1));
        registry.announce(&c, UserId::new(2));

        let mut of_user = registry.connections_of_user(UserId::new(1));
        of_user.sort_by_key(|id| *id.as_uuid());
        let mut expected = vec![a, b];
        expected.sort_by_key(|id| *id.as_uuid());

        assert_eq!(of_user, expected);
    }

    #[test]
    fn test_send_reports_closed_receiver() {
        // テスト項目: 受信側が閉じていると送信は false を返す
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionIdFactory::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(id, tx, Timestamp::new(0));

        assert!(registry.get(&id).unwrap().send("ping".to_string()));
        drop(rx);
        assert!(!registry.get(&id).unwrap().send("ping".to_string()));
    }
}
