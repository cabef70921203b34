//! UseCase: Room からの退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() / leave_member()
//!
//! ### なぜこのテストが必要か
//! - 退出は leave-room・切断・ハートビート・Room の移動の全てで共通
//! - 古い接続の退出で、再接続したユーザーを追い出してはならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：残りのメンバーへの offline 通知とメンバー一覧の更新
//! - エッジケース：最後のメンバーの退出（Room 削除、通知なし）
//! - エッジケース：入力中のユーザーの退出（typing false の通知）
//! - 異常系：メンバーでない Room からの退出

use std::sync::Arc;

use super::{
    broadcast::RoomBroadcaster, error::LeaveError, identity::IdentityResolver,
    room_lock::RoomLocks,
};
use crate::domain::{
    ConnectionId, ConnectionRegistry, LeaveOutcome, RoomId, RoomRepository, Username, presence,
};

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    connections: Arc<dyn ConnectionRegistry>,
    locks: Arc<RoomLocks>,
    broadcaster: Arc<RoomBroadcaster>,
    identity: Arc<IdentityResolver>,
}

impl LeaveRoomUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        connections: Arc<dyn ConnectionRegistry>,
        locks: Arc<RoomLocks>,
        broadcaster: Arc<RoomBroadcaster>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            rooms,
            connections,
            locks,
            broadcaster,
            identity,
        }
    }

    /// `leave-room` を実行
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        token: Option<&str>,
    ) -> Result<LeaveOutcome, LeaveError> {
        let identity = self.identity.resolve(&connection_id, token).await?;

        let outcome = self
            .leave_member(&connection_id, &room_id, &identity.username)
            .await
            .ok_or_else(|| LeaveError::NotMember {
                room_id: room_id.clone(),
                username: identity.username.clone(),
            })?;

        if self.connections.current_room(&connection_id).await.as_ref() == Some(&room_id) {
            self.connections
                .set_current_room(&connection_id, None)
                .await;
        }

        Ok(outcome)
    }

    /// Remove the member bound to `connection_id` and notify the rest of the room.
    ///
    /// Returns `None` when the username is not bound to this connection
    /// (never joined, or already replaced by a reconnect).
    pub async fn leave_member(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        username: &Username,
    ) -> Option<LeaveOutcome> {
        let guard = self.locks.acquire(room_id).await;
        let outcome = self.leave_locked(connection_id, room_id, username).await;
        drop(guard);

        self.locks
            .release_if_vacant(room_id, self.rooms.as_ref())
            .await;
        outcome
    }

    /// Same as [`Self::leave_member`], for a caller already holding the room lock.
    pub(crate) async fn leave_locked(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        username: &Username,
    ) -> Option<LeaveOutcome> {
        let outcome = self.rooms.leave(room_id, username, connection_id).await?;
        for event in presence::on_leave(room_id, &outcome) {
            self.broadcaster.broadcast(room_id, &event, None).await;
        }
        tracing::info!(
            "'{}' left room '{}' ({} remaining)",
            username,
            room_id,
            outcome.remaining.len()
        );
        Some(outcome)
    }
}
