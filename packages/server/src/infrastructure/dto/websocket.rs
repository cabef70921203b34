//! WebSocket message DTOs for the room relay.
//!
//! Every frame is a JSON object tagged by `method`.

use serde::{Deserialize, Serialize};

/// Request sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum ClientRequest {
    JoinRoom {
        room: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        token: Option<String>,
    },
    LeaveRoom {
        room: String,
        #[serde(default)]
        token: Option<String>,
    },
    SendMessage {
        room: String,
        message: String,
        #[serde(default)]
        token: Option<String>,
    },
    Typing {
        room: String,
        #[serde(default)]
        token: Option<String>,
    },
    StopTyping {
        room: String,
        #[serde(default)]
        token: Option<String>,
    },
}

impl ClientRequest {
    pub fn method(&self) -> &'static str {
        match self {
            ClientRequest::JoinRoom { .. } => "join-room",
            ClientRequest::LeaveRoom { .. } => "leave-room",
            ClientRequest::SendMessage { .. } => "send-message",
            ClientRequest::Typing { .. } => "typing",
            ClientRequest::StopTyping { .. } => "stop-typing",
        }
    }
}

/// Method tag of an outbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventMethod {
    MessageHistory,
    NewMessage,
    RoomUsersUpdate,
    UserPresence,
    Typing,
    RoomFull,
    AuthError,
}

/// Chat message as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub message_id: String,
    pub author: String,
    pub author_id: i64,
    pub message: String,
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
    /// `hh:mm am/pm` in the display offset
    pub formatted_time: String,
}

/// Recent messages sent to a joining connection, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHistoryEvent {
    pub method: EventMethod,
    pub room_id: String,
    pub messages: Vec<MessageDto>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageEvent {
    pub method: EventMethod,
    pub room_id: String,
    #[serde(flatten)]
    pub message: MessageDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUsersUpdateEvent {
    pub method: EventMethod,
    pub room_id: String,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresenceEvent {
    pub method: EventMethod,
    pub room_id: String,
    pub user: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingEvent {
    pub method: EventMethod,
    pub room_id: String,
    pub user: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomFullEvent {
    pub method: EventMethod,
    pub room_id: String,
    pub max_users: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthErrorEvent {
    pub method: EventMethod,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_room_without_token() {
        // テスト項目: token なしの join-room をパースできる
        // given (前提条件):
        let json = r#"{"method":"join-room","room":"demo","username":"alice"}"#;

        // when (操作):
        let request: ClientRequest = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            request,
            ClientRequest::JoinRoom {
                room: "demo".to_string(),
                username: Some("alice".to_string()),
                token: None,
            }
        );
        assert_eq!(request.method(), "join-room");
    }

    #[test]
    fn test_parse_send_message_with_token() {
        // テスト項目: token 付きの send-message をパースできる
        // given (前提条件):
        let json = r#"{"method":"send-message","room":"demo","message":"hi","token":"abc"}"#;

        // when (操作):
        let request: ClientRequest = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            request,
            ClientRequest::SendMessage {
                room: "demo".to_string(),
                message: "hi".to_string(),
                token: Some("abc".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_stop_typing() {
        // テスト項目: stop-typing をパースできる
        // given (前提条件):
        let json = r#"{"method":"stop-typing","room":"demo"}"#;

        // when (操作):
        let request: ClientRequest = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            request,
            ClientRequest::StopTyping {
                room: "demo".to_string(),
                token: None,
            }
        );
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        // テスト項目: 未知の method はパースエラーになる
        // given (前提条件):
        let json = r#"{"method":"delete-everything","room":"demo"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientRequest>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_room_is_rejected() {
        // テスト項目: room のない typing はパースエラーになる
        // given (前提条件):
        let json = r#"{"method":"typing"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientRequest>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_typing_event_field_names() {
        // テスト項目: 送信イベントのフィールドは camelCase で method タグを持つ
        // given (前提条件):
        let event = TypingEvent {
            method: EventMethod::Typing,
            room_id: "demo".to_string(),
            user: "alice".to_string(),
            is_typing: true,
        };

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            serde_json::json!({
                "method": "typing",
                "roomId": "demo",
                "user": "alice",
                "isTyping": true
            })
        );
    }
}
