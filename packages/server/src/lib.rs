//! Chattrix direct-messaging server library.
//!
//! REST endpoints for accounts, chats and messages, plus a WebSocket push
//! channel that delivers presence and message events to live clients.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod realtime;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::Config;
pub use ui::run;
