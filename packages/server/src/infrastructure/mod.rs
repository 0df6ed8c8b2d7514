//! Infrastructure layer: persistence, outbound gateways and wire DTOs.

pub mod db;
pub mod dto;
pub mod mailer;
pub mod password;
pub mod repository;
pub mod storage;
