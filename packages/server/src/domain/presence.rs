//! Presence & typing transitions.
//!
//! Presence is never stored on its own: "online" means "has a member entry".
//! These functions turn Room Table outcomes into the events the rest of the
//! room should observe.

use super::{JoinOutcome, LeaveOutcome, PresenceStatus, RoomId, ServerEvent, Username};

/// Events caused by a successful join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEvents {
    /// `user-presence online`, for everyone but the joining user
    pub presence: Option<ServerEvent>,
    /// `room-users-update`, for everyone
    pub members: ServerEvent,
}

/// Derive the events of a join.
///
/// A replacement of an existing member (reconnect) is not a presence
/// transition: the user never went offline from the room's point of view.
pub fn on_join(room_id: &RoomId, outcome: &JoinOutcome) -> JoinEvents {
    let presence = outcome.is_fresh_join().then(|| ServerEvent::UserPresence {
        room_id: room_id.clone(),
        user: outcome.member.username.clone(),
        status: PresenceStatus::Online,
    });

    JoinEvents {
        presence,
        members: ServerEvent::RoomUsersUpdate {
            room_id: room_id.clone(),
            users: outcome.usernames(),
        },
    }
}

/// Derive the events the remaining members observe after a leave.
///
/// Nothing is emitted when the room was deleted.
pub fn on_leave(room_id: &RoomId, outcome: &LeaveOutcome) -> Vec<ServerEvent> {
    if outcome.room_deleted {
        return Vec::new();
    }

    let user = outcome.removed.username.clone();
    let mut events = vec![ServerEvent::UserPresence {
        room_id: room_id.clone(),
        user: user.clone(),
        status: PresenceStatus::Offline,
    }];
    if outcome.was_typing {
        events.push(ServerEvent::Typing {
            room_id: room_id.clone(),
            user,
            is_typing: false,
        });
    }
    events.push(ServerEvent::RoomUsersUpdate {
        room_id: room_id.clone(),
        users: outcome.usernames(),
    });
    events
}

/// Derive the typing event, only when the flag changed.
pub fn on_typing(
    room_id: &RoomId,
    user: &Username,
    is_typing: bool,
    changed: bool,
) -> Option<ServerEvent> {
    changed.then(|| ServerEvent::Typing {
        room_id: room_id.clone(),
        user: user.clone(),
        is_typing,
    })
}
