//! UseCase layer
//!
//! One use case per client request, plus the shared room machinery they
//! are built from:
//!
//! - `RoomLocks`: per-room serialization
//! - `RoomBroadcaster`: fan-out to room members
//! - `HistoryReplay`: recent messages for a joining connection
//! - `IdentityResolver`: token / guest / connection identity

pub mod broadcast;
pub mod disconnect_connection;
pub mod error;
pub mod history;
pub mod identity;
pub mod join_room;
pub mod leave_room;
pub mod room_lock;
pub mod send_message;
pub mod typing;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcast::RoomBroadcaster;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::{JoinError, LeaveError, SendMessageError, TypingError};
pub use history::HistoryReplay;
pub use identity::IdentityResolver;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use room_lock::RoomLocks;
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;
