//! In-memory real-time core: who is connected, who is online, who listens
//! to which chat, and how chat events reach them.

pub mod hub;
pub mod membership;
pub mod presence;
pub mod registry;

pub use hub::{Departure, HubStats, RealtimeHub};
pub use membership::RoomMembership;
pub use presence::{OfflineTransition, OnlineTransition, PresenceTracker};
pub use registry::{AnnounceOutcome, Connection, ConnectionRegistry};
