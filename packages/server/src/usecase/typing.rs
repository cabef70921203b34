//! UseCase: 入力中通知（typing / stop-typing）

use std::sync::Arc;

use super::{
    broadcast::RoomBroadcaster, error::TypingError, identity::IdentityResolver,
    room_lock::RoomLocks,
};
use crate::domain::{ConnectionId, RoomId, RoomRepository, presence};

pub struct TypingUseCase {
    rooms: Arc<dyn RoomRepository>,
    locks: Arc<RoomLocks>,
    broadcaster: Arc<RoomBroadcaster>,
    identity: Arc<IdentityResolver>,
}

impl TypingUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        locks: Arc<RoomLocks>,
        broadcaster: Arc<RoomBroadcaster>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            rooms,
            locks,
            broadcaster,
            identity,
        }
    }

    /// Set the typing flag and notify the other members on a transition.
    ///
    /// Returns whether the flag changed.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        is_typing: bool,
        token: Option<&str>,
    ) -> Result<bool, TypingError> {
        let identity = self.identity.resolve(&connection_id, token).await?;
        let username = identity.username;

        let guard = self.locks.acquire(&room_id).await;
        let changed = if self
            .rooms
            .is_member(&room_id, &username, &connection_id)
            .await
        {
            self.rooms
                .set_typing(&room_id, &username, is_typing)
                .await
                .ok()
        } else {
            None
        };
        let Some(changed) = changed else {
            drop(guard);
            self.locks
                .release_if_vacant(&room_id, self.rooms.as_ref())
                .await;
            return Err(TypingError::NotMember { room_id, username });
        };

        if let Some(event) = presence::on_typing(&room_id, &username, is_typing, changed) {
            self.broadcaster
                .broadcast(&room_id, &event, Some(&username))
                .await;
        }
        drop(guard);
        Ok(changed)
    }
}
