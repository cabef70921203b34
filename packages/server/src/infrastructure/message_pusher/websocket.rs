//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - イベントを JSON にエンコード（1 イベントにつき 1 回）
//! - 接続ごとの `PusherChannel` へのキューイング
//!
//! WebSocket への書き込みは UI 層の writer タスク（`pusher_loop`）が行います。
//! ここではキューに積むだけなので、ロック保持中に呼んでも遅い接続に引きずられません。

use async_trait::async_trait;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, OutboundFrame, ServerEvent};
use crate::infrastructure::{connection::ConnectionMap, dto::encode_event};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// Connection Registry と共有する接続マップ
    connections: ConnectionMap,
    /// `formattedTime` の表示オフセット（分）
    display_offset_minutes: i32,
}

impl WebSocketMessagePusher {
    pub fn new(connections: ConnectionMap, display_offset_minutes: i32) -> Self {
        Self {
            connections,
            display_offset_minutes,
        }
    }

    fn encode(&self, event: &ServerEvent) -> Result<String, MessagePushError> {
        encode_event(event, self.display_offset_minutes)
            .map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let payload = self.encode(event)?;
        let connections = self.connections.lock().await;

        let connection = connections
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        connection
            .sender
            .send(OutboundFrame::Text(payload))
            .map_err(|_| MessagePushError::ConnectionClosed(connection_id.to_string()))?;
        tracing::debug!(
            "Pushed '{}' to connection '{}'",
            event.method(),
            connection_id
        );
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let payload = self.encode(event)?;
        let connections = self.connections.lock().await;

        for target in targets {
            let Some(connection) = connections.get(&target) else {
                tracing::warn!(
                    "Connection '{}' not found during broadcast, skipping",
                    target
                );
                continue;
            };
            if connection.sender.is_closed() {
                tracing::debug!("Connection '{}' already closed, skipping", target);
                continue;
            }
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = connection.sender.send(OutboundFrame::Text(payload.clone())) {
                tracing::warn!("Failed to push '{}' to '{}': {}", event.method(), target, e);
            }
        }
        tracing::debug!("Broadcasted '{}'", event.method());

        Ok(())
    }
}
