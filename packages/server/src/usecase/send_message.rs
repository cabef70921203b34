//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute()
//!
//! ### なぜこのテストが必要か
//! - メッセージは保存に成功した場合のみ、送信者を含む全メンバーに配信される
//! - メンバーでない接続からの送信は保存も配信もされない
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者を含む全メンバーへの配信
//! - 異常系：空のメッセージ、未参加の Room、保存の失敗
//! - エッジケース：置き換えられた古い接続からの送信

use std::sync::Arc;

use agora_shared::time::Clock;

use super::{
    broadcast::RoomBroadcaster, error::SendMessageError, identity::IdentityResolver,
    room_lock::RoomLocks,
};
use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, MessageIdFactory, MessageStore, RoomId,
    RoomRepository, ServerEvent, Timestamp,
};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    rooms: Arc<dyn RoomRepository>,
    store: Arc<dyn MessageStore>,
    locks: Arc<RoomLocks>,
    broadcaster: Arc<RoomBroadcaster>,
    identity: Arc<IdentityResolver>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        store: Arc<dyn MessageStore>,
        locks: Arc<RoomLocks>,
        broadcaster: Arc<RoomBroadcaster>,
        identity: Arc<IdentityResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            store,
            locks,
            broadcaster,
            identity,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 保存され、配信されたメッセージ
    /// * `Err(SendMessageError)` - 送信失敗（何も配信されない）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        text: String,
        token: Option<&str>,
    ) -> Result<ChatMessage, SendMessageError> {
        let identity = self.identity.resolve(&connection_id, token).await?;
        let content = MessageContent::new(text).map_err(SendMessageError::InvalidContent)?;

        let not_member = || SendMessageError::NotMember {
            room_id: room_id.clone(),
            username: identity.username.clone(),
        };
        if !self
            .rooms
            .is_member(&room_id, &identity.username, &connection_id)
            .await
        {
            return Err(not_member());
        }

        let message = ChatMessage::new(
            MessageIdFactory::generate(),
            &identity,
            room_id.clone(),
            content,
            Timestamp::new(self.clock.now_millis()),
        );

        // No room lock is held across storage I/O
        let stored = self.store.append(message).await?;

        let guard = self.locks.acquire(&room_id).await;
        if !self
            .rooms
            .is_member(&room_id, &identity.username, &connection_id)
            .await
        {
            drop(guard);
            tracing::warn!(
                "'{}' left room '{}' before message '{}' was delivered",
                identity.username,
                room_id,
                stored.id
            );
            return Err(not_member());
        }
        let delivered = self
            .broadcaster
            .broadcast(&room_id, &ServerEvent::NewMessage(stored.clone()), None)
            .await;
        drop(guard);

        tracing::debug!(
            "Message '{}' from '{}' delivered to {} member(s) of room '{}'",
            stored.id,
            identity.username,
            delivered,
            room_id
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessageStore, StoreError, ValueObjectError};
    use crate::usecase::test_support::{Harness, drain, methods, room_id, username};

    #[tokio::test]
    async fn test_send_message_reaches_every_member_including_sender() {
        // テスト項目: メッセージは送信者を含む全メンバーに 1 回ずつ届く
        // given (前提条件):
        let harness = Harness::new();
        let (alice, mut alice_rx) = harness.joined("demo", "alice").await;
        let (_bob, mut bob_rx) = harness.joined("demo", "bob").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        // when (操作):
        let stored = harness
            .send()
            .execute(alice, room_id("demo"), "hi".to_string(), None)
            .await
            .unwrap();

        // then (期待する結果):
        for rx in [&mut alice_rx, &mut bob_rx] {
            let events = drain(rx);
            assert_eq!(methods(&events), vec!["new-message"]);
            assert_eq!(events[0]["author"], "alice");
            assert_eq!(events[0]["message"], "hi");
            assert_eq!(events[0]["messageId"], stored.id.to_string());
        }
    }

    #[tokio::test]
    async fn test_sent_message_is_persisted() {
        // テスト項目: 送信したメッセージは履歴に保存される
        // given (前提条件):
        let harness = Harness::new();
        let (alice, _alice_rx) = harness.joined("demo", "alice").await;

        // when (操作):
        harness
            .send()
            .execute(alice, room_id("demo"), "hi".to_string(), None)
            .await
            .unwrap();

        // then (期待する結果):
        let recent = harness
            .store
            .query_recent(&room_id("demo"), 50, 0)
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].author, username("alice"));
    }

    #[tokio::test]
    async fn test_send_to_other_rooms_is_isolated() {
        // テスト項目: 別の Room のメンバーにはメッセージが届かない
        // given (前提条件):
        let harness = Harness::new();
        let (alice, _alice_rx) = harness.joined("a", "alice").await;
        let (_bob, mut bob_rx) = harness.joined("b", "bob").await;
        drain(&mut bob_rx);

        // when (操作):
        harness
            .send()
            .execute(alice, room_id("a"), "only a".to_string(), None)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_send_empty_message_is_rejected() {
        // テスト項目: 空白だけのメッセージは拒否される
        // given (前提条件):
        let harness = Harness::new();
        let (alice, mut alice_rx) = harness.joined("demo", "alice").await;
        drain(&mut alice_rx);

        // when (操作):
        let result = harness
            .send()
            .execute(alice, room_id("demo"), "   ".to_string(), None)
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::InvalidContent(
                ValueObjectError::MessageContentEmpty
            ))
        );
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_send_to_room_not_joined() {
        // テスト項目: 参加していない Room への送信は拒否され、保存もされない
        // given (前提条件):
        let harness = Harness::new();
        let (alice, _alice_rx) = harness.joined("demo", "alice").await;

        // when (操作):
        let result = harness
            .send()
            .execute(alice, room_id("other"), "hi".to_string(), None)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendMessageError::NotMember { .. })));
        let recent = harness
            .store
            .query_recent(&room_id("other"), 50, 0)
            .await
            .unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_send_from_replaced_connection() {
        // テスト項目: 再接続で置き換えられた古い接続からの送信は拒否される
        // given (前提条件):
        let harness = Harness::new();
        let (old, _old_rx) = harness.joined("demo", "alice").await;
        let (_new, _new_rx) = harness.joined("demo", "alice").await;

        // when (操作):
        let result = harness
            .send()
            .execute(old, room_id("demo"), "ghost".to_string(), None)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendMessageError::NotMember { .. })));
    }

    #[tokio::test]
    async fn test_send_without_join() {
        // テスト項目: 参加前の送信は識別できずに拒否される
        // given (前提条件):
        let harness = Harness::new();
        let (connection, _rx) = harness.connect().await;

        // when (操作):
        let result = harness
            .send()
            .execute(connection, room_id("demo"), "hi".to_string(), None)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendMessageError::Auth(_))));
    }

    #[tokio::test]
    async fn test_persistence_failure_drops_message() {
        // テスト項目: 保存に失敗したメッセージは誰にも配信されない
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_query_recent()
            .returning(|_, _, _| Ok(vec![]));
        store
            .expect_append()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("disk full".to_string())));
        let harness = Harness::with_store(Arc::new(store));
        let (alice, mut alice_rx) = harness.joined("demo", "alice").await;
        let (_bob, mut bob_rx) = harness.joined("demo", "bob").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        // when (操作):
        let result = harness
            .send()
            .execute(alice, room_id("demo"), "lost".to_string(), None)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendMessageError::Persistence(_))));
        assert!(drain(&mut alice_rx).is_empty());
        assert!(drain(&mut bob_rx).is_empty());
    }
}
