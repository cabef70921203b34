//! Infrastructure layer
//!
//! Concrete implementations of the domain interfaces:
//!
//! - `repository`: in-memory Room Table and message store
//! - `connection`: Connection Registry
//! - `message_pusher`: WebSocket delivery
//! - `auth`: JWT verification
//! - `dto`: wire format

pub mod auth;
pub mod connection;
pub mod dto;
pub mod message_pusher;
pub mod repository;
