//! MessagePusher trait 定義
//!
//! クライアントへのイベント送信（通知）のインターフェース。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, ServerEvent};

/// Frame queued for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Encoded JSON event
    Text(String),
    /// Heartbeat probe
    Ping,
    /// Close the transport
    Close,
}

/// Channel used to hand frames to a connection's writer task
pub type PusherChannel = mpsc::UnboundedSender<OutboundFrame>;

/// MessagePusher trait
///
/// Delivery is an enqueue on the connection's channel; it never waits on
/// the socket.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 特定の接続にイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にイベントを送信
    ///
    /// Per-connection failures are logged and skipped.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;
}
