//! Events pushed from the relay to clients.

use super::{ChatMessage, RoomId, Username};

/// Online/offline status of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Online,
    Offline,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Offline => "offline",
        }
    }
}

/// Outbound event, independent of the wire format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Recent messages, oldest first, sent to a joining connection only
    MessageHistory {
        room_id: RoomId,
        messages: Vec<ChatMessage>,
    },
    NewMessage(ChatMessage),
    RoomUsersUpdate {
        room_id: RoomId,
        users: Vec<Username>,
    },
    UserPresence {
        room_id: RoomId,
        user: Username,
        status: PresenceStatus,
    },
    Typing {
        room_id: RoomId,
        user: Username,
        is_typing: bool,
    },
    RoomFull {
        room_id: RoomId,
        max_users: usize,
    },
    AuthError {
        message: String,
    },
}

impl ServerEvent {
    /// Wire name of the event
    pub fn method(&self) -> &'static str {
        match self {
            ServerEvent::MessageHistory { .. } => "message-history",
            ServerEvent::NewMessage(_) => "new-message",
            ServerEvent::RoomUsersUpdate { .. } => "room-users-update",
            ServerEvent::UserPresence { .. } => "user-presence",
            ServerEvent::Typing { .. } => "typing",
            ServerEvent::RoomFull { .. } => "room-full",
            ServerEvent::AuthError { .. } => "auth-error",
        }
    }
}
