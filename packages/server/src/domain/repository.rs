//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ChatMessage, ConnectionId, JoinOutcome, LeaveOutcome, Member, RepositoryError, Room, RoomId,
    StoreError, Timestamp, Username,
};

/// Room Table
///
/// Maps a room key to its member set. Every method is atomic with respect to
/// the table; callers that need several calls to observe a consistent room
/// hold the room's lock from `RoomLocks`.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を取得
    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    /// 存在する全ての Room ID を取得
    async fn room_ids(&self) -> Vec<RoomId>;

    /// メンバーを追加（同じユーザー名のエントリは置き換え）
    ///
    /// The room is created with `capacity` if it does not exist yet.
    async fn join(
        &self,
        room_id: &RoomId,
        member: Member,
        capacity: usize,
        now: Timestamp,
    ) -> Result<JoinOutcome, RepositoryError>;

    /// メンバーを削除（`connection_id` に紐づいている場合のみ）
    ///
    /// Deletes the room when its last member leaves.
    async fn leave(
        &self,
        room_id: &RoomId,
        username: &Username,
        connection_id: &ConnectionId,
    ) -> Option<LeaveOutcome>;

    /// Room のメンバー一覧を取得（参加順）
    async fn get_members(&self, room_id: &RoomId) -> Vec<Member>;

    /// `username` が `connection_id` に紐づくメンバーかどうか
    async fn is_member(
        &self,
        room_id: &RoomId,
        username: &Username,
        connection_id: &ConnectionId,
    ) -> bool;

    /// 入力中フラグを更新し、変化したかどうかを返す
    async fn set_typing(
        &self,
        room_id: &RoomId,
        username: &Username,
        is_typing: bool,
    ) -> Result<bool, RepositoryError>;

    /// Room のメンバー数を取得
    async fn count_members(&self, room_id: &RoomId) -> usize;
}

/// Persistent message log keyed by room and creation time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message and return the stored record
    async fn append(&self, message: ChatMessage) -> Result<ChatMessage, StoreError>;

    /// Most recent non-deleted messages of a room, newest first
    async fn query_recent(
        &self,
        room_id: &RoomId,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<ChatMessage>, StoreError>;
}
