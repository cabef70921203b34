//! Broadcast Engine
//!
//! Fans an event out to the members of a room. Callers hold the room's lock
//! so the member list read here is the one the event belongs to.

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRepository, ServerEvent, Username};

pub struct RoomBroadcaster {
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RoomBroadcaster {
    pub fn new(rooms: Arc<dyn RoomRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            rooms,
            message_pusher,
        }
    }

    /// Deliver `event` to every member of the room except `exclude`.
    ///
    /// Returns the number of targeted connections. Failures are logged and
    /// never abort the fan-out.
    pub async fn broadcast(
        &self,
        room_id: &RoomId,
        event: &ServerEvent,
        exclude: Option<&Username>,
    ) -> usize {
        let targets: Vec<ConnectionId> = self
            .rooms
            .get_members(room_id)
            .await
            .into_iter()
            .filter(|member| Some(&member.username) != exclude)
            .map(|member| member.connection_id)
            .collect();
        let count = targets.len();
        if count == 0 {
            return 0;
        }

        if let Err(e) = self.message_pusher.broadcast(targets, event).await {
            tracing::warn!(
                "Failed to broadcast '{}' in room '{}': {}",
                event.method(),
                room_id,
                e
            );
        }
        count
    }

    /// Deliver `event` to a single connection.
    pub async fn send_to(&self, connection_id: &ConnectionId, event: &ServerEvent) -> bool {
        match self.message_pusher.push_to(connection_id, event).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to send '{}' to '{}': {}",
                    event.method(),
                    connection_id,
                    e
                );
                false
            }
        }
    }
}
