//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{AuthError, RepositoryError, RoomId, StoreError, Username, ValueObjectError};

/// 参加（join-room）のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Room {room_id} is full (max {capacity} users)")]
    RoomFull { room_id: RoomId, capacity: usize },

    #[error(transparent)]
    Repository(RepositoryError),
}

/// 退出（leave-room）のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaveError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("'{username}' is not a member of room {room_id} on this connection")]
    NotMember { room_id: RoomId, username: Username },
}

/// メッセージ送信（send-message）のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid message: {0}")]
    InvalidContent(ValueObjectError),

    #[error("'{username}' is not a member of room {room_id} on this connection")]
    NotMember { room_id: RoomId, username: Username },

    #[error("Failed to persist message: {0}")]
    Persistence(#[from] StoreError),
}

/// 入力中通知（typing / stop-typing）のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypingError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("'{username}' is not a member of room {room_id} on this connection")]
    NotMember { room_id: RoomId, username: Username },
}
