//! Per-room serialization.
//!
//! Every mutation of a room and the enqueue of the events it causes happen
//! while holding that room's lock, so all members observe a room's events in
//! the same order. Rooms never contend with each other.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{RoomId, RoomRepository};

#[derive(Default)]
pub struct RoomLocks {
    locks: Mutex<HashMap<RoomId, Arc<Mutex<()>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a room.
    pub async fn acquire(&self, room_id: &RoomId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(room_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop the room's lock entry if nobody holds or waits on it.
    ///
    /// Must be called after the guard was dropped.
    pub async fn release_if_idle(&self, room_id: &RoomId) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(room_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(room_id);
        }
    }

    /// Drop the room's lock entry once the room itself is gone.
    pub async fn release_if_vacant(&self, room_id: &RoomId, rooms: &dyn RoomRepository) {
        if rooms.get_room(room_id).await.is_none() {
            self.release_if_idle(room_id).await;
        }
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_same_room_is_serialized() {
        // テスト項目: 同じ Room のロックは同時に 1 つしか取得できない
        // given (前提条件):
        let locks = Arc::new(RoomLocks::new());
        let guard = locks.acquire(&room_id("demo")).await;

        // when (操作):
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&room_id("demo")).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // then (期待する結果):
        assert!(!contender.is_finished());
        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_rooms_do_not_contend() {
        // テスト項目: 別の Room のロックは互いに待たない
        // given (前提条件):
        let locks = RoomLocks::new();
        let _a = locks.acquire(&room_id("a")).await;

        // when (操作):
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&room_id("b"))).await;

        // then (期待する結果):
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_release_if_idle_keeps_held_lock() {
        // テスト項目: 保持中のロックは解放されず、解放後に削除される
        // given (前提条件):
        let locks = RoomLocks::new();
        let guard = locks.acquire(&room_id("demo")).await;

        // when (操作):
        locks.release_if_idle(&room_id("demo")).await;

        // then (期待する結果):
        assert_eq!(locks.len().await, 1);
        drop(guard);
        locks.release_if_idle(&room_id("demo")).await;
        assert!(locks.is_empty().await);
    }
}
