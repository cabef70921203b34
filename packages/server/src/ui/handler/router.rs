//! Message Router
//!
//! Dispatches a decoded client request to its use case and turns the
//! client-facing failures into events for the requesting connection.

use crate::{
    domain::{AuthError, ConnectionId, MessagePusher, RoomId, ServerEvent},
    infrastructure::dto::ClientRequest,
    ui::state::AppState,
    usecase::{JoinError, LeaveError, SendMessageError, TypingError},
};

/// Decode a text frame. Malformed frames and unknown methods yield `None`.
pub fn parse_request(text: &str) -> Option<ClientRequest> {
    match serde_json::from_str::<ClientRequest>(text) {
        Ok(request) => Some(request),
        Err(e) => {
            tracing::warn!("Ignoring unrecognized frame: {}", e);
            None
        }
    }
}

async fn reply(state: &AppState, connection_id: &ConnectionId, event: ServerEvent) {
    if let Err(e) = state.message_pusher.push_to(connection_id, &event).await {
        tracing::warn!(
            "Failed to reply '{}' to '{}': {}",
            event.method(),
            connection_id,
            e
        );
    }
}

async fn reply_auth_error(state: &AppState, connection_id: &ConnectionId, error: AuthError) {
    tracing::warn!("Auth failure on '{}': {}", connection_id, error);
    reply(
        state,
        connection_id,
        ServerEvent::AuthError {
            message: error.to_string(),
        },
    )
    .await;
}

/// Route one request. Requests of a connection are handled in arrival order.
pub async fn route_request(state: &AppState, connection_id: ConnectionId, request: ClientRequest) {
    let method = request.method();
    let is_typing = matches!(request, ClientRequest::Typing { .. });
    tracing::debug!("Routing '{}' from '{}'", method, connection_id);

    match request {
        ClientRequest::JoinRoom {
            room,
            username,
            token,
        } => {
            let Some(room_id) = parse_room(&room, method) else {
                return;
            };
            let result = state
                .join_room_usecase
                .execute(
                    connection_id,
                    room_id,
                    username.as_deref(),
                    token.as_deref(),
                )
                .await;
            match result {
                Ok(_) => {}
                Err(JoinError::Auth(e)) => reply_auth_error(state, &connection_id, e).await,
                Err(JoinError::RoomFull { room_id, capacity }) => {
                    reply(
                        state,
                        &connection_id,
                        ServerEvent::RoomFull {
                            room_id,
                            max_users: capacity,
                        },
                    )
                    .await
                }
                Err(e) => tracing::warn!("join-room from '{}' failed: {}", connection_id, e),
            }
        }
        ClientRequest::LeaveRoom { room, token } => {
            let Some(room_id) = parse_room(&room, method) else {
                return;
            };
            match state
                .leave_room_usecase
                .execute(connection_id, room_id, token.as_deref())
                .await
            {
                Ok(_) => {}
                Err(LeaveError::Auth(e)) => reply_auth_error(state, &connection_id, e).await,
                Err(e) => tracing::warn!("leave-room from '{}' ignored: {}", connection_id, e),
            }
        }
        ClientRequest::SendMessage {
            room,
            message,
            token,
        } => {
            let Some(room_id) = parse_room(&room, method) else {
                return;
            };
            match state
                .send_message_usecase
                .execute(connection_id, room_id, message, token.as_deref())
                .await
            {
                Ok(_) => {}
                Err(SendMessageError::Auth(e)) => {
                    reply_auth_error(state, &connection_id, e).await
                }
                Err(SendMessageError::Persistence(e)) => {
                    tracing::error!("Message from '{}' dropped: {}", connection_id, e)
                }
                Err(e) => tracing::warn!("send-message from '{}' ignored: {}", connection_id, e),
            }
        }
        ClientRequest::Typing { room, token } | ClientRequest::StopTyping { room, token } => {
            let Some(room_id) = parse_room(&room, method) else {
                return;
            };
            match state
                .typing_usecase
                .execute(connection_id, room_id, is_typing, token.as_deref())
                .await
            {
                Ok(_) => {}
                Err(TypingError::Auth(e)) => reply_auth_error(state, &connection_id, e).await,
                Err(e) => tracing::warn!("{} from '{}' ignored: {}", method, connection_id, e),
            }
        }
    }
}

fn parse_room(room: &str, method: &str) -> Option<RoomId> {
    match RoomId::new(room.to_string()) {
        Ok(room_id) => Some(room_id),
        Err(e) => {
            tracing::warn!("Ignoring '{}' with invalid room: {}", method, e);
            None
        }
    }
}
