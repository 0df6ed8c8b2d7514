//! REST and WebSocket server.

pub mod error;
mod handler;
pub mod router;
mod runner;
mod signal;
pub mod state;

pub use runner::{ServerError, run};
