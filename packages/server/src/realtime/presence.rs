//! Presence Tracker
//!
//! Reference-counted: a user is online while at least one announced
//! connection for that user is alive.

use std::collections::HashMap;

use crate::domain::UserId;

/// Effect of `mark_online`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnlineTransition {
    /// 0 → 1
    CameOnline,
    /// n → n + 1
    AlreadyOnline,
}

/// Effect of `mark_offline`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineTransition {
    /// 1 → 0
    WentOffline,
    /// n → n - 1, n > 1
    StillOnline,
    /// The user was not tracked
    NotTracked,
}

/// Online users with their live connection counts
#[derive(Debug, Default)]
pub struct PresenceTracker {
    counts: HashMap<UserId, usize>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_online(&mut self, user_id: UserId) -> OnlineTransition {
        let count = self.counts.entry(user_id).or_insert(0);
        *count += 1;
        if *count == 1 {
            OnlineTransition::CameOnline
        } else {
            OnlineTransition::AlreadyOnline
        }
    }

    pub fn mark_offline(&mut self, user_id: UserId) -> OfflineTransition {
        let Some(count) = self.counts.get_mut(&user_id) else {
            return OfflineTransition::NotTracked;
        };
        if *count > 1 {
            *count -= 1;
            return OfflineTransition::StillOnline;
        }
        self.counts.remove(&user_id);
        OfflineTransition::WentOffline
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.counts.contains_key(&user_id)
    }

    pub fn connection_count(&self, user_id: UserId) -> usize {
        self.counts.get(&user_id).copied().unwrap_or(0)
    }

    /// Online user ids, ascending
    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.counts.keys().copied().collect();
        users.sort();
        users
    }
}
