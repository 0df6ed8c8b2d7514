//! Room Membership Manager
//!
//! Chat room → subscribed connections. Rooms exist only while they have members.

use std::collections::{HashMap, HashSet};

use crate::domain::{ChatId, ConnectionId};

#[derive(Debug, Default)]
pub struct RoomMembership {
    rooms: HashMap<ChatId, HashSet<ConnectionId>>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `connection` to `room`. `false` if it was already a member.
    pub fn join(&mut self, connection: ConnectionId, room: ChatId) -> bool {
        self.rooms.entry(room).or_default().insert(connection)
    }

    /// Remove `connection` from `room`. `false` if it was not a member.
    pub fn leave(&mut self, connection: &ConnectionId, room: ChatId) -> bool {
        let Some(members) = self.rooms.get_mut(&room) else {
            return false;
        };
        let removed = members.remove(connection);
        if members.is_empty() {
            self.rooms.remove(&room);
        }
        removed
    }

    /// Remove `connection` from each of `rooms`.
    pub fn drop_connection<'a>(
        &mut self,
        connection: &ConnectionId,
        rooms: impl IntoIterator<Item = &'a ChatId>,
    ) {
        for room in rooms {
            self.leave(connection, *room);
        }
    }

    pub fn members_of(&self, room: ChatId) -> Vec<ConnectionId> {
        self.rooms
            .get(&room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, connection: &ConnectionId, room: ChatId) -> bool {
        self.rooms
            .get(&room)
            .is_some_and(|members| members.contains(connection))
    }

    /// Number of rooms with at least one member
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
