//! Shared utilities for Chattrix.

pub mod logger;
pub mod time;
