//! InMemory Connection Registry 実装

use std::sync::Arc;

use agora_shared::time::Clock;
use async_trait::async_trait;

use super::ConnectionMap;
use crate::domain::{
    Connection, ConnectionId, ConnectionIdFactory, ConnectionRegistry, Identity, OutboundFrame,
    PusherChannel, RoomId, Timestamp,
};

pub struct InMemoryConnectionRegistry {
    connections: ConnectionMap,
    clock: Arc<dyn Clock>,
}

impl InMemoryConnectionRegistry {
    pub fn new(connections: ConnectionMap, clock: Arc<dyn Clock>) -> Self {
        Self { connections, clock }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, sender: PusherChannel) -> ConnectionId {
        let id = ConnectionIdFactory::generate();
        let mut connections = self.connections.lock().await;
        connections.insert(id, Connection::new(id, sender, self.now()));
        tracing::debug!(
            "Connection '{}' registered ({} total)",
            id,
            connections.len()
        );
        id
    }

    async fn mark_alive(&self, connection_id: &ConnectionId) {
        let now = self.now();
        let mut connections = self.connections.lock().await;
        if let Some(connection) = connections.get_mut(connection_id) {
            connection.is_alive = true;
            connection.last_pong_at = now;
        }
    }

    async fn sweep(&self) -> Vec<ConnectionId> {
        let mut connections = self.connections.lock().await;
        let mut dead = Vec::new();

        for connection in connections.values_mut() {
            if !connection.is_alive {
                // Receiver may already be gone
                let _ = connection.sender.send(OutboundFrame::Close);
                dead.push(connection.id);
                continue;
            }

            connection.is_alive = false;
            if connection.sender.send(OutboundFrame::Ping).is_err() {
                dead.push(connection.id);
            }
        }

        if !dead.is_empty() {
            tracing::info!(
                "Heartbeat sweep found {} dead connection(s) out of {}",
                dead.len(),
                connections.len()
            );
        }
        dead
    }

    async fn unregister(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        if connections.remove(connection_id).is_some() {
            tracing::debug!(
                "Connection '{}' unregistered ({} remaining)",
                connection_id,
                connections.len()
            );
        }
    }

    async fn identity(&self, connection_id: &ConnectionId) -> Option<Identity> {
        let connections = self.connections.lock().await;
        connections
            .get(connection_id)
            .and_then(|c| c.identity.clone())
    }

    async fn set_identity(&self, connection_id: &ConnectionId, identity: Identity) {
        let mut connections = self.connections.lock().await;
        if let Some(connection) = connections.get_mut(connection_id) {
            connection.identity = Some(identity);
        }
    }

    async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let connections = self.connections.lock().await;
        connections
            .get(connection_id)
            .and_then(|c| c.room_id.clone())
    }

    async fn set_current_room(&self, connection_id: &ConnectionId, room_id: Option<RoomId>) {
        let mut connections = self.connections.lock().await;
        if let Some(connection) = connections.get_mut(connection_id) {
            connection.room_id = room_id;
        }
    }

    async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use agora_shared::time::FixedClock;
    use tokio::sync::{Mutex, mpsc};

    use super::*;
    use crate::domain::Username;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 接続の登録 / 登録解除
    // - ハートビートのスイープ（応答のない接続の検出）
    //
    // 【なぜこのテストが必要か】
    // - 応答のない接続がメンバーとして残り続けるとブロードキャストが無駄になる
    // - 応答のある接続を誤って切断してはならない
    // ========================================

    fn create_test_registry() -> (InMemoryConnectionRegistry, ConnectionMap) {
        let connections: ConnectionMap = Arc::new(Mutex::new(HashMap::new()));
        let registry =
            InMemoryConnectionRegistry::new(connections.clone(), Arc::new(FixedClock::new(1000)));
        (registry, connections)
    }

    #[tokio::test]
    async fn test_register_and_unregister() {
        // テスト項目: 接続を登録し、登録解除できる
        // given (前提条件):
        let (registry, connections) = create_test_registry();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let id = registry.register(tx).await;

        // then (期待する結果):
        assert_eq!(registry.count().await, 1);
        {
            let connections = connections.lock().await;
            let connection = connections.get(&id).unwrap();
            assert!(connection.is_alive);
            assert_eq!(connection.connected_at, Timestamp::new(1000));
        }

        registry.unregister(&id).await;
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_first_sweep_probes_live_connections() {
        // テスト項目: 生きている接続には Ping が送られ、未応答としてマークされる
        // given (前提条件):
        let (registry, connections) = create_test_registry();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = registry.register(tx).await;

        // when (操作):
        let dead = registry.sweep().await;

        // then (期待する結果):
        assert!(dead.is_empty());
        assert_eq!(rx.recv().await, Some(OutboundFrame::Ping));
        assert!(!connections.lock().await.get(&id).unwrap().is_alive);
    }

    #[tokio::test]
    async fn test_unanswered_probe_is_dead_on_next_sweep() {
        // テスト項目: Ping に応答しなかった接続は次のスイープで Close され、返される
        // given (前提条件):
        let (registry, _connections) = create_test_registry();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = registry.register(tx).await;
        registry.sweep().await;

        // when (操作):
        let dead = registry.sweep().await;

        // then (期待する結果):
        assert_eq!(dead, vec![id]);
        assert_eq!(rx.recv().await, Some(OutboundFrame::Ping));
        assert_eq!(rx.recv().await, Some(OutboundFrame::Close));
        // 切断処理が識別情報を読めるよう、登録は残る
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_answered_probe_survives() {
        // テスト項目: Pong を返した接続は次のスイープでも生き残る
        // given (前提条件):
        let (registry, _connections) = create_test_registry();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(tx).await;
        registry.sweep().await;

        // when (操作):
        registry.mark_alive(&id).await;
        let dead = registry.sweep().await;

        // then (期待する結果):
        assert!(dead.is_empty());
    }

    #[tokio::test]
    async fn test_closed_channel_is_dead_immediately() {
        // テスト項目: 送信先が閉じている接続は最初のスイープで検出される
        // given (前提条件):
        let (registry, _connections) = create_test_registry();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register(tx).await;
        drop(rx);

        // when (操作):
        let dead = registry.sweep().await;

        // then (期待する結果):
        assert_eq!(dead, vec![id]);
    }

    #[tokio::test]
    async fn test_identity_and_current_room() {
        // テスト項目: 接続ごとの識別情報と現在の Room を保持する
        // given (前提条件):
        let (registry, _connections) = create_test_registry();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(tx).await;
        let identity = Identity::guest(Username::new("alice".to_string()).unwrap());
        let room = RoomId::new("demo".to_string()).unwrap();

        // when (操作):
        registry.set_identity(&id, identity.clone()).await;
        registry.set_current_room(&id, Some(room.clone())).await;

        // then (期待する結果):
        assert_eq!(registry.identity(&id).await, Some(identity));
        assert_eq!(registry.current_room(&id).await, Some(room));

        registry.set_current_room(&id, None).await;
        assert_eq!(registry.current_room(&id).await, None);
    }
}
