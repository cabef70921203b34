//! Agora: a room-based chat relay over WebSocket.
//!
//! Clients join named rooms, exchange messages and typing notifications
//! with the other members, and receive recent history when they join.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
