//! Server state and dependency wiring.

use std::{collections::HashMap, sync::Arc};

use agora_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::{
    config::ServerConfig,
    domain::{ConnectionRegistry, MessagePusher, MessageStore, RoomRepository, TokenVerifier},
    infrastructure::{
        auth::JwtTokenVerifier,
        connection::{ConnectionMap, InMemoryConnectionRegistry},
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMessageStore, InMemoryRoomRepository},
    },
    usecase::{
        DisconnectConnectionUseCase, HistoryReplay, IdentityResolver, JoinRoomUseCase,
        LeaveRoomUseCase, RoomBroadcaster, RoomLocks, SendMessageUseCase, TypingUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    /// Room Table
    pub rooms: Arc<dyn RoomRepository>,
    /// Connection Registry
    pub connections: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub typing_usecase: Arc<TypingUseCase>,
    pub disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
}

impl AppState {
    /// Wire the in-memory message store and the JWT verifier.
    pub fn build(config: ServerConfig) -> Self {
        let store: Arc<dyn MessageStore> = Arc::new(InMemoryMessageStore::default());
        let verifier: Arc<dyn TokenVerifier> =
            Arc::new(JwtTokenVerifier::new(config.jwt_secret.as_bytes()));
        Self::with_collaborators(config, store, verifier)
    }

    /// Wire the relay around the given storage and auth collaborators.
    ///
    /// Dependencies are created in order:
    /// 1. Room Table / Connection Registry
    /// 2. MessagePusher
    /// 3. Room machinery (locks, broadcast, history, identity)
    /// 4. UseCases
    pub fn with_collaborators(
        config: ServerConfig,
        store: Arc<dyn MessageStore>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 1. Room Table / Connection Registry
        let rooms: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::default());
        let connection_map: ConnectionMap = Arc::new(Mutex::new(HashMap::new()));
        let connections: Arc<dyn ConnectionRegistry> = Arc::new(
            InMemoryConnectionRegistry::new(connection_map.clone(), clock.clone()),
        );

        // 2. MessagePusher (shares the connection map with the registry)
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new(
            connection_map,
            config.display_utc_offset_minutes,
        ));

        // 3. Room machinery
        let locks = Arc::new(RoomLocks::new());
        let broadcaster = Arc::new(RoomBroadcaster::new(
            rooms.clone(),
            message_pusher.clone(),
        ));
        let history = Arc::new(HistoryReplay::new(
            store.clone(),
            broadcaster.clone(),
            config.policy.history_limit,
        ));
        let identity = Arc::new(IdentityResolver::new(
            verifier,
            connections.clone(),
            config.require_auth,
        ));

        // 4. UseCases
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            rooms.clone(),
            connections.clone(),
            locks.clone(),
            broadcaster.clone(),
            identity.clone(),
        ));
        let join_room_usecase = Arc::new(JoinRoomUseCase::new(
            rooms.clone(),
            connections.clone(),
            locks.clone(),
            broadcaster.clone(),
            history,
            identity.clone(),
            leave_room_usecase.clone(),
            config.policy,
            clock.clone(),
        ));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(
            rooms.clone(),
            store,
            locks.clone(),
            broadcaster.clone(),
            identity.clone(),
            clock,
        ));
        let typing_usecase = Arc::new(TypingUseCase::new(
            rooms.clone(),
            locks,
            broadcaster,
            identity,
        ));
        let disconnect_connection_usecase = Arc::new(DisconnectConnectionUseCase::new(
            connections.clone(),
            leave_room_usecase.clone(),
        ));

        Self {
            config,
            rooms,
            connections,
            message_pusher,
            join_room_usecase,
            leave_room_usecase,
            send_message_usecase,
            typing_usecase,
            disconnect_connection_usecase,
        }
    }
}
