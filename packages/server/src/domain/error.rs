//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors related to Room domain logic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Room capacity exceeded error
    #[error("Room capacity exceeded: maximum {capacity} members allowed (current: {current})")]
    CapacityExceeded { capacity: usize, current: usize },
}

/// Errors returned by the Room Table
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),
}

/// Errors returned when pushing an event to a connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    #[error("Failed to encode event: {0}")]
    EncodeFailed(String),
}

/// Errors returned by the message store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Message store unavailable: {0}")]
    Unavailable(String),

    #[error("Duplicate message id: {0}")]
    DuplicateMessageId(String),
}

/// Errors returned when resolving the identity behind a request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Authentication required")]
    MissingToken,

    #[error("Join a room before sending requests")]
    NotJoined,

    #[error("Invalid username: {0}")]
    InvalidUsername(ValueObjectError),
}
