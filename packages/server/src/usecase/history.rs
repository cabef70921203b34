//! History Replay
//!
//! Sends a joining connection the most recent messages of its room, oldest
//! first.

use std::sync::Arc;

use super::broadcast::RoomBroadcaster;
use crate::domain::{ChatMessage, ConnectionId, MessageStore, RoomId, ServerEvent};

pub struct HistoryReplay {
    store: Arc<dyn MessageStore>,
    broadcaster: Arc<RoomBroadcaster>,
    limit: usize,
}

impl HistoryReplay {
    pub fn new(store: Arc<dyn MessageStore>, broadcaster: Arc<RoomBroadcaster>, limit: usize) -> Self {
        Self {
            store,
            broadcaster,
            limit,
        }
    }

    /// Load the recent messages of a room, oldest first.
    ///
    /// A storage failure degrades to an empty history.
    pub async fn load(&self, room_id: &RoomId) -> Vec<ChatMessage> {
        match self.store.query_recent(room_id, self.limit, 0).await {
            Ok(mut messages) => {
                messages.reverse();
                messages
            }
            Err(e) => {
                tracing::warn!("Failed to load history for room '{}': {}", room_id, e);
                Vec::new()
            }
        }
    }

    /// Send one `message-history` event to the connection.
    pub async fn deliver(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        messages: Vec<ChatMessage>,
    ) -> bool {
        let count = messages.len();
        let event = ServerEvent::MessageHistory {
            room_id: room_id.clone(),
            messages,
        };
        let delivered = self.broadcaster.send_to(connection_id, &event).await;
        if delivered {
            tracing::debug!(
                "Replayed {} message(s) of room '{}' to '{}'",
                count,
                room_id,
                connection_id
            );
        }
        delivered
    }
}
