//! Connection Registry trait 定義

use async_trait::async_trait;

use super::{ConnectionId, Identity, PusherChannel, RoomId, Timestamp};

/// Bookkeeping for one live connection
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub sender: PusherChannel,
    /// Answered the last heartbeat probe
    pub is_alive: bool,
    pub last_pong_at: Timestamp,
    pub connected_at: Timestamp,
    pub identity: Option<Identity>,
    pub room_id: Option<RoomId>,
}

impl Connection {
    pub fn new(id: ConnectionId, sender: PusherChannel, connected_at: Timestamp) -> Self {
        Self {
            id,
            sender,
            is_alive: true,
            last_pong_at: connected_at,
            connected_at,
            identity: None,
            room_id: None,
        }
    }
}

/// Connection Registry
///
/// Owns every live connection; the Room Table only refers to them by id.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 新しい接続を登録
    async fn register(&self, sender: PusherChannel) -> ConnectionId;

    /// ハートビート応答を受信した
    async fn mark_alive(&self, connection_id: &ConnectionId);

    /// 前回のスイープ以降に応答のなかった接続を閉じて返す
    ///
    /// Surviving connections are marked not-alive and probed again.
    /// Returned connections stay registered until the caller has run the
    /// disconnect cleanup and unregistered them.
    async fn sweep(&self) -> Vec<ConnectionId>;

    /// 接続を登録解除
    async fn unregister(&self, connection_id: &ConnectionId);

    async fn identity(&self, connection_id: &ConnectionId) -> Option<Identity>;

    async fn set_identity(&self, connection_id: &ConnectionId, identity: Identity);

    async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomId>;

    async fn set_current_room(&self, connection_id: &ConnectionId, room_id: Option<RoomId>);

    /// 接続数を取得
    async fn count(&self) -> usize;
}
