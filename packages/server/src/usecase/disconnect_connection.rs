//! UseCase: 接続の切断処理
//!
//! Runs for a transport close and for a connection the heartbeat declared
//! dead. Both paths end here so cleanup happens exactly once per
//! connection.

use std::sync::Arc;

use super::leave_room::LeaveRoomUseCase;
use crate::domain::{ConnectionId, ConnectionRegistry, LeaveOutcome};

/// 接続切断のユースケース
pub struct DisconnectConnectionUseCase {
    connections: Arc<dyn ConnectionRegistry>,
    leave: Arc<LeaveRoomUseCase>,
}

impl DisconnectConnectionUseCase {
    pub fn new(connections: Arc<dyn ConnectionRegistry>, leave: Arc<LeaveRoomUseCase>) -> Self {
        Self { connections, leave }
    }

    /// 切断を実行
    ///
    /// Leaves the connection's current room (if it is still the bound
    /// member) and unregisters it.
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<LeaveOutcome> {
        let room_id = self.connections.current_room(&connection_id).await;
        let identity = self.connections.identity(&connection_id).await;

        let outcome = match (room_id, identity) {
            (Some(room_id), Some(identity)) => {
                self.leave
                    .leave_member(&connection_id, &room_id, &identity.username)
                    .await
            }
            _ => None,
        };

        self.connections.unregister(&connection_id).await;
        tracing::info!("Connection '{}' disconnected", connection_id);
        outcome
    }
}
