//! UseCase: Room への参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute()
//!
//! ### なぜこのテストが必要か
//! - 参加は識別・上限チェック・履歴の再生・在室通知をまとめて行う唯一の入口
//! - 同一ユーザーのメンバーエントリは常に 1 つでなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回参加、2 人目の参加（alice/bob のシナリオ）
//! - エッジケース：同一ユーザーの再接続（置き換え、online 通知なし）
//! - エッジケース：別の Room への移動（参加が認められてから前の Room を退出）
//! - 並行性：同時参加でも上限とユーザー名ごとの 1 エントリが守られる
//! - 異常系：上限超過（別の Room にいても状態は変わらない）、無効なトークン

use std::sync::Arc;

use agora_shared::time::Clock;

use super::{
    broadcast::RoomBroadcaster, error::JoinError, history::HistoryReplay,
    identity::IdentityResolver, leave_room::LeaveRoomUseCase, room_lock::RoomLocks,
};
use crate::domain::{
    ConnectionId, ConnectionRegistry, Identity, JoinOutcome, Member, RepositoryError, RoomError,
    RoomId, RoomPolicy, RoomRepository, Timestamp, Username, presence,
};

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    connections: Arc<dyn ConnectionRegistry>,
    locks: Arc<RoomLocks>,
    broadcaster: Arc<RoomBroadcaster>,
    history: Arc<HistoryReplay>,
    identity: Arc<IdentityResolver>,
    leave: Arc<LeaveRoomUseCase>,
    policy: RoomPolicy,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        connections: Arc<dyn ConnectionRegistry>,
        locks: Arc<RoomLocks>,
        broadcaster: Arc<RoomBroadcaster>,
        history: Arc<HistoryReplay>,
        identity: Arc<IdentityResolver>,
        leave: Arc<LeaveRoomUseCase>,
        policy: RoomPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            connections,
            locks,
            broadcaster,
            history,
            identity,
            leave,
            policy,
            clock,
        }
    }

    /// `join-room` を実行
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加後のメンバー一覧と置き換えたエントリ
    /// * `Err(JoinError)` - 識別失敗、または上限超過（状態は変わらない）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        username: Option<&str>,
        token: Option<&str>,
    ) -> Result<JoinOutcome, JoinError> {
        let identity = self.identity.resolve_for_join(token, username)?;
        let previous = self
            .previous_membership(&connection_id, &room_id, &identity)
            .await;

        // Loaded before the member is inserted, outside the room lock
        let history = self.history.load(&room_id).await;

        let guard = self.locks.acquire(&room_id).await;
        if let Some((previous_room, previous_name)) = &previous
            && previous_room == &room_id
        {
            // Renamed in place: the old entry frees its slot under this lock
            self.leave
                .leave_locked(&connection_id, &room_id, previous_name)
                .await;
        }
        let now = Timestamp::new(self.clock.now_millis());
        let member = Member::new(identity.clone(), connection_id, now);

        let outcome = match self
            .rooms
            .join(&room_id, member, self.policy.max_users, now)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                drop(guard);
                self.locks
                    .release_if_vacant(&room_id, self.rooms.as_ref())
                    .await;
                return Err(match e {
                    RepositoryError::Room(RoomError::CapacityExceeded { capacity, .. }) => {
                        tracing::warn!(
                            "Room '{}' is full, rejecting '{}'",
                            room_id,
                            identity.username
                        );
                        JoinError::RoomFull { room_id, capacity }
                    }
                    other => JoinError::Repository(other),
                });
            }
        };

        self.connections
            .set_identity(&connection_id, identity.clone())
            .await;
        self.connections
            .set_current_room(&connection_id, Some(room_id.clone()))
            .await;
        if let Some(displaced) = outcome.displaced_connection() {
            // The old connection stays open but no longer speaks for the user
            self.connections.set_current_room(&displaced, None).await;
            tracing::info!(
                "'{}' reconnected to room '{}', replacing connection '{}'",
                identity.username,
                room_id,
                displaced
            );
        }

        self.history
            .deliver(&connection_id, &room_id, history)
            .await;

        let events = presence::on_join(&room_id, &outcome);
        if let Some(online) = &events.presence {
            self.broadcaster
                .broadcast(&room_id, online, Some(&identity.username))
                .await;
        }
        self.broadcaster
            .broadcast(&room_id, &events.members, None)
            .await;
        drop(guard);

        tracing::info!(
            "'{}' joined room '{}' ({} member(s))",
            identity.username,
            room_id,
            outcome.members.len()
        );

        // Only once admitted here does the connection give up its old room
        if let Some((previous_room, previous_name)) = previous
            && previous_room != room_id
        {
            self.leave
                .leave_member(&connection_id, &previous_room, &previous_name)
                .await;
        }
        Ok(outcome)
    }

    /// The membership this join supersedes.
    ///
    /// Rejoining the same room under the same username is a replacement and
    /// supersedes nothing.
    async fn previous_membership(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        identity: &Identity,
    ) -> Option<(RoomId, Username)> {
        let previous_room = self.connections.current_room(connection_id).await?;
        let previous = self.connections.identity(connection_id).await?;
        if &previous_room == room_id && previous.username == identity.username {
            return None;
        }
        Some((previous_room, previous.username))
    }
}
