//! Domain layer for the room relay.
//!
//! This module contains the room/member model and the interfaces the
//! use cases depend on. Infrastructure provides the implementations.

pub mod auth;
pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod message_pusher;
pub mod policy;
pub mod presence;
pub mod repository;
pub mod value_object;

pub use auth::TokenVerifier;
pub use connection::{Connection, ConnectionRegistry};
pub use entity::{
    ChatMessage, DEFAULT_ROOM_CAPACITY, Identity, JoinOutcome, LeaveOutcome, Member, Room,
};
pub use error::{
    AuthError, MessagePushError, RepositoryError, RoomError, StoreError, ValueObjectError,
};
pub use event::{PresenceStatus, ServerEvent};
pub use factory::{ConnectionIdFactory, MessageIdFactory};
pub use message_pusher::{MessagePusher, OutboundFrame, PusherChannel};
pub use policy::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT, RoomPolicy};
pub use repository::{MessageStore, RoomRepository};
pub use value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId, Username,
};

#[cfg(test)]
pub use auth::MockTokenVerifier;
#[cfg(test)]
pub use repository::MockMessageStore;
