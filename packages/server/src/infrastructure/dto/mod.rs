//! Data Transfer Objects for HTTP and WebSocket.

pub mod http;
pub mod websocket;
