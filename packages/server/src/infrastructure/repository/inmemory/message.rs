//! InMemory MessageStore 実装
//!
//! Messages are kept per room in append order, which is also creation order.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, MessageStore, RoomId, StoreError};

/// インメモリ MessageStore 実装
pub struct InMemoryMessageStore {
    messages: Arc<Mutex<HashMap<RoomId, Vec<ChatMessage>>>>,
}

impl InMemoryMessageStore {
    pub fn new(messages: Arc<Mutex<HashMap<RoomId, Vec<ChatMessage>>>>) -> Self {
        Self { messages }
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: ChatMessage) -> Result<ChatMessage, StoreError> {
        let mut messages = self.messages.lock().await;
        let log = messages.entry(message.room_id.clone()).or_default();
        if log.iter().any(|m| m.id == message.id) {
            return Err(StoreError::DuplicateMessageId(message.id.to_string()));
        }
        log.push(message.clone());
        tracing::debug!(
            "Stored message '{}' in room '{}' ({} total)",
            message.id,
            message.room_id,
            log.len()
        );
        Ok(message)
    }

    async fn query_recent(
        &self,
        room_id: &RoomId,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let messages = self.messages.lock().await;
        let recent = messages
            .get(room_id)
            .map(|log| {
                log.iter()
                    .rev()
                    .filter(|m| !m.is_deleted)
                    .skip(skip)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(recent)
    }
}
