//! Core domain models for the room relay.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    error::RoomError,
    value_object::{ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId, Username},
};

/// Default maximum number of members allowed in a room
pub const DEFAULT_ROOM_CAPACITY: usize = 100;

/// Identity of the user behind a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: Username,
}

impl Identity {
    pub fn new(user_id: UserId, username: Username) -> Self {
        Self { user_id, username }
    }

    /// Identity for a client that joined without a token
    pub fn guest(username: Username) -> Self {
        Self {
            user_id: UserId::GUEST,
            username,
        }
    }
}

/// Association of one user with one live connection inside a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub username: Username,
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub joined_at: Timestamp,
}

impl Member {
    pub fn new(identity: Identity, connection_id: ConnectionId, joined_at: Timestamp) -> Self {
        Self {
            username: identity.username,
            user_id: identity.user_id,
            connection_id,
            joined_at,
        }
    }

    /// Whether this member entry is bound to the given connection
    pub fn is_bound_to(&self, connection_id: &ConnectionId) -> bool {
        &self.connection_id == connection_id
    }
}

/// Represents a chat room and its current members
///
/// A room is only kept alive while it has members; the Room Table drops it
/// as soon as the last member leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Members in join order, at most one per username
    pub members: Vec<Member>,
    /// Members currently typing
    pub typing: BTreeSet<Username>,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
    /// Maximum number of members allowed
    pub capacity: usize,
}

impl Room {
    /// Create a new empty room with the default capacity
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self::with_capacity(id, created_at, DEFAULT_ROOM_CAPACITY)
    }

    /// Create a new empty room with a custom capacity
    pub fn with_capacity(id: RoomId, created_at: Timestamp, capacity: usize) -> Self {
        Self {
            id,
            members: Vec::new(),
            typing: BTreeSet::new(),
            created_at,
            capacity,
        }
    }

    /// Add a member to the room, replacing any previous entry for the same username
    ///
    /// A replacement keeps the member's position and never counts against
    /// the capacity.
    ///
    /// # Returns
    ///
    /// The replaced member entry, if any
    ///
    /// # Errors
    ///
    /// Returns `RoomError::CapacityExceeded` if the room is full and the
    /// username is not already a member
    pub fn add_member(&mut self, member: Member) -> Result<Option<Member>, RoomError> {
        if let Some(existing) = self
            .members
            .iter_mut()
            .find(|m| m.username == member.username)
        {
            let replaced = std::mem::replace(existing, member);
            return Ok(Some(replaced));
        }

        if self.members.len() >= self.capacity {
            return Err(RoomError::CapacityExceeded {
                capacity: self.capacity,
                current: self.members.len(),
            });
        }
        self.members.push(member);
        Ok(None)
    }

    /// Remove a member, but only while it is still bound to `connection_id`
    ///
    /// Returns the removed entry and whether the member was typing.
    pub fn remove_member(
        &mut self,
        username: &Username,
        connection_id: &ConnectionId,
    ) -> Option<(Member, bool)> {
        let index = self
            .members
            .iter()
            .position(|m| &m.username == username && m.is_bound_to(connection_id))?;
        let removed = self.members.remove(index);
        let was_typing = self.typing.remove(username);
        Some((removed, was_typing))
    }

    /// Get a member by username
    pub fn member(&self, username: &Username) -> Option<&Member> {
        self.members.iter().find(|m| &m.username == username)
    }

    /// Whether `username` is a member bound to `connection_id`
    pub fn is_member_connection(&self, username: &Username, connection_id: &ConnectionId) -> bool {
        self.member(username)
            .is_some_and(|m| m.is_bound_to(connection_id))
    }

    /// Usernames in join order
    pub fn usernames(&self) -> Vec<Username> {
        self.members.iter().map(|m| m.username.clone()).collect()
    }

    /// Update the typing flag of a member
    ///
    /// Returns `true` only when the flag actually changed.
    pub fn set_typing(&mut self, username: &Username, is_typing: bool) -> bool {
        if is_typing {
            if self.member(username).is_none() {
                return false;
            }
            self.typing.insert(username.clone())
        } else {
            self.typing.remove(username)
        }
    }

    pub fn is_typing(&self, username: &Username) -> bool {
        self.typing.contains(username)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// Represents a chat message in the domain model
///
/// Messages are immutable once created; the edit/delete fields are kept for
/// the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: Username,
    pub author_id: UserId,
    pub room_id: RoomId,
    pub content: MessageContent,
    pub created_at: Timestamp,
    pub is_edited: bool,
    pub edited_at: Option<Timestamp>,
    pub is_deleted: bool,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(
        id: MessageId,
        author: &Identity,
        room_id: RoomId,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            author: author.username.clone(),
            author_id: author.user_id,
            room_id,
            content,
            created_at,
            is_edited: false,
            edited_at: None,
            is_deleted: false,
        }
    }
}

/// Result of adding a member to the Room Table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The member that was inserted
    pub member: Member,
    /// The entry it replaced (reconnect of the same username)
    pub replaced: Option<Member>,
    /// Members after the join, in join order
    pub members: Vec<Member>,
    /// Whether the room was created by this join
    pub room_created: bool,
}

impl JoinOutcome {
    /// Whether the join brought a previously absent user into the room
    pub fn is_fresh_join(&self) -> bool {
        self.replaced.is_none()
    }

    /// The connection that was displaced by this join, if it differs from the new one
    pub fn displaced_connection(&self) -> Option<ConnectionId> {
        self.replaced
            .as_ref()
            .filter(|r| r.connection_id != self.member.connection_id)
            .map(|r| r.connection_id)
    }

    pub fn usernames(&self) -> Vec<Username> {
        self.members.iter().map(|m| m.username.clone()).collect()
    }
}

/// Result of removing a member from the Room Table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub removed: Member,
    pub was_typing: bool,
    /// Members left in the room, in join order
    pub remaining: Vec<Member>,
    /// Whether the room was deleted because it became empty
    pub room_deleted: bool,
}

impl LeaveOutcome {
    pub fn usernames(&self) -> Vec<Username> {
        self.remaining.iter().map(|m| m.username.clone()).collect()
    }
}
