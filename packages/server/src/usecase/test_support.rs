//! Test harness wiring the use cases to the in-memory infrastructure.

use std::{collections::HashMap, sync::Arc};

use agora_shared::time::{Clock, FixedClock};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use super::{
    DisconnectConnectionUseCase, JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase,
    TypingUseCase, broadcast::RoomBroadcaster, history::HistoryReplay,
    identity::IdentityResolver, room_lock::RoomLocks,
};
use crate::domain::{
    ChatMessage, ConnectionId, ConnectionRegistry, DEFAULT_HISTORY_LIMIT, DEFAULT_ROOM_CAPACITY,
    Identity, MessageContent, MessageIdFactory, MessageStore, OutboundFrame, RoomId,
    RoomPolicy, RoomRepository, Timestamp, TokenVerifier, Username,
};
use crate::infrastructure::{
    auth::JwtTokenVerifier,
    connection::{ConnectionMap, InMemoryConnectionRegistry},
    message_pusher::WebSocketMessagePusher,
    repository::{InMemoryMessageStore, InMemoryRoomRepository},
};

pub(crate) const TEST_SECRET: &[u8] = b"test-secret";

pub(crate) struct Harness {
    pub rooms: Arc<dyn RoomRepository>,
    pub connections: Arc<dyn ConnectionRegistry>,
    pub store: Arc<dyn MessageStore>,
    pub locks: Arc<RoomLocks>,
    pub broadcaster: Arc<RoomBroadcaster>,
    pub history: Arc<HistoryReplay>,
    pub identity: Arc<IdentityResolver>,
    pub clock: Arc<dyn Clock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(
            Arc::new(InMemoryMessageStore::default()),
            Arc::new(JwtTokenVerifier::new(TEST_SECRET)),
            false,
            DEFAULT_HISTORY_LIMIT,
        )
    }

    pub fn with_store(store: Arc<dyn MessageStore>) -> Self {
        Self::build(
            store,
            Arc::new(JwtTokenVerifier::new(TEST_SECRET)),
            false,
            DEFAULT_HISTORY_LIMIT,
        )
    }

    pub fn with_verifier(verifier: Arc<dyn TokenVerifier>, require_auth: bool) -> Self {
        Self::build(
            Arc::new(InMemoryMessageStore::default()),
            verifier,
            require_auth,
            DEFAULT_HISTORY_LIMIT,
        )
    }

    pub fn with_history_limit(limit: usize) -> Self {
        Self::build(
            Arc::new(InMemoryMessageStore::default()),
            Arc::new(JwtTokenVerifier::new(TEST_SECRET)),
            false,
            limit,
        )
    }

    fn build(
        store: Arc<dyn MessageStore>,
        verifier: Arc<dyn TokenVerifier>,
        require_auth: bool,
        history_limit: usize,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(1_704_067_200_000));
        let connection_map: ConnectionMap = Arc::new(Mutex::new(HashMap::new()));
        let connections: Arc<dyn ConnectionRegistry> = Arc::new(
            InMemoryConnectionRegistry::new(connection_map.clone(), clock.clone()),
        );
        let rooms: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::default());
        let pusher = Arc::new(WebSocketMessagePusher::new(connection_map, 600));
        let broadcaster = Arc::new(RoomBroadcaster::new(rooms.clone(), pusher));
        let history = Arc::new(HistoryReplay::new(
            store.clone(),
            broadcaster.clone(),
            history_limit,
        ));
        let identity = Arc::new(IdentityResolver::new(
            verifier,
            connections.clone(),
            require_auth,
        ));

        Self {
            rooms,
            connections,
            store,
            locks: Arc::new(RoomLocks::new()),
            broadcaster,
            history,
            identity,
            clock,
        }
    }

    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.connections.register(tx).await;
        (id, rx)
    }

    /// Connect and join `room` as a guest
    pub async fn joined(
        &self,
        room: &str,
        name: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (id, rx) = self.connect().await;
        self.join()
            .execute(id, room_id(room), Some(name), None)
            .await
            .unwrap();
        (id, rx)
    }

    pub fn leave(&self) -> Arc<LeaveRoomUseCase> {
        Arc::new(LeaveRoomUseCase::new(
            self.rooms.clone(),
            self.connections.clone(),
            self.locks.clone(),
            self.broadcaster.clone(),
            self.identity.clone(),
        ))
    }

    pub fn join(&self) -> JoinRoomUseCase {
        self.join_with_max_users(DEFAULT_ROOM_CAPACITY)
    }

    pub fn join_with_max_users(&self, max_users: usize) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            self.rooms.clone(),
            self.connections.clone(),
            self.locks.clone(),
            self.broadcaster.clone(),
            self.history.clone(),
            self.identity.clone(),
            self.leave(),
            RoomPolicy::new(max_users, DEFAULT_HISTORY_LIMIT),
            self.clock.clone(),
        )
    }

    pub fn send(&self) -> SendMessageUseCase {
        SendMessageUseCase::new(
            self.rooms.clone(),
            self.store.clone(),
            self.locks.clone(),
            self.broadcaster.clone(),
            self.identity.clone(),
            self.clock.clone(),
        )
    }

    pub fn typing(&self) -> TypingUseCase {
        TypingUseCase::new(
            self.rooms.clone(),
            self.locks.clone(),
            self.broadcaster.clone(),
            self.identity.clone(),
        )
    }

    pub fn disconnect(&self) -> DisconnectConnectionUseCase {
        DisconnectConnectionUseCase::new(self.connections.clone(), self.leave())
    }
}

pub(crate) fn room_id(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub(crate) fn username(name: &str) -> Username {
    Username::new(name.to_string()).unwrap()
}

pub(crate) fn chat_message(room: &str, author: &str, text: &str, at: i64) -> ChatMessage {
    ChatMessage::new(
        MessageIdFactory::generate(),
        &Identity::guest(username(author)),
        room_id(room),
        MessageContent::new(text.to_string()).unwrap(),
        Timestamp::new(at),
    )
}

pub(crate) async fn identity_of(harness: &Harness, connection_id: &ConnectionId) -> Identity {
    harness.connections.identity(connection_id).await.unwrap()
}

/// Take every queued text frame, decoded as JSON
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundFrame>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        if let OutboundFrame::Text(text) = frame {
            events.push(serde_json::from_str(&text).unwrap());
        }
    }
    events
}

pub(crate) fn methods(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .map(|e| e["method"].as_str().unwrap_or_default().to_string())
        .collect()
}
