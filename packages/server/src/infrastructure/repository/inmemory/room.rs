//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap を Room Table として使用します。
//!
//! Invariant: a room key is present only while its member set is non-empty.
//! Empty rooms are removed inside the same critical section that emptied
//! them.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, JoinOutcome, LeaveOutcome, Member, RepositoryError, Room, RoomId,
    RoomRepository, Timestamp, Username,
};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// Room ID → Room
    rooms: Arc<Mutex<HashMap<RoomId, Room>>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(rooms: Arc<Mutex<HashMap<RoomId, Room>>>) -> Self {
        Self { rooms }
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).cloned()
    }

    async fn room_ids(&self) -> Vec<RoomId> {
        let rooms = self.rooms.lock().await;
        let mut ids: Vec<RoomId> = rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn join(
        &self,
        room_id: &RoomId,
        member: Member,
        capacity: usize,
        now: Timestamp,
    ) -> Result<JoinOutcome, RepositoryError> {
        let mut rooms = self.rooms.lock().await;

        let room_created = !rooms.contains_key(room_id);
        let room = rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::with_capacity(room_id.clone(), now, capacity));

        match room.add_member(member.clone()) {
            Ok(replaced) => Ok(JoinOutcome {
                member,
                replaced,
                members: room.members.clone(),
                room_created,
            }),
            Err(e) => {
                if room.is_empty() {
                    rooms.remove(room_id);
                }
                Err(e.into())
            }
        }
    }

    async fn leave(
        &self,
        room_id: &RoomId,
        username: &Username,
        connection_id: &ConnectionId,
    ) -> Option<LeaveOutcome> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id)?;
        let (removed, was_typing) = room.remove_member(username, connection_id)?;

        let remaining = room.members.clone();
        let room_deleted = room.is_empty();
        if room_deleted {
            rooms.remove(room_id);
        }

        Some(LeaveOutcome {
            removed,
            was_typing,
            remaining,
            room_deleted,
        })
    }

    async fn get_members(&self, room_id: &RoomId) -> Vec<Member> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    async fn is_member(
        &self,
        room_id: &RoomId,
        username: &Username,
        connection_id: &ConnectionId,
    ) -> bool {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .is_some_and(|room| room.is_member_connection(username, connection_id))
    }

    async fn set_typing(
        &self,
        room_id: &RoomId,
        username: &Username,
        is_typing: bool,
    ) -> Result<bool, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;
        if room.member(username).is_none() {
            return Err(RepositoryError::MemberNotFound(username.as_str().to_string()));
        }
        Ok(room.set_typing(username, is_typing))
    }

    async fn count_members(&self, room_id: &RoomId) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).map(Room::len).unwrap_or(0)
    }
}
