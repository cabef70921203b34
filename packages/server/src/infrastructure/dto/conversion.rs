//! Domain → DTO conversion

use agora_shared::time::{format_clock_time, timestamp_to_rfc3339};

use super::websocket::{
    AuthErrorEvent, EventMethod, MessageDto, MessageHistoryEvent, NewMessageEvent, RoomFullEvent,
    RoomUsersUpdateEvent, TypingEvent, UserPresenceEvent,
};
use crate::domain::{ChatMessage, RoomId, ServerEvent, Username};

pub fn message_to_dto(message: &ChatMessage, display_offset_minutes: i32) -> MessageDto {
    let millis = message.created_at.value();
    MessageDto {
        message_id: message.id.to_string(),
        author: message.author.as_str().to_string(),
        author_id: message.author_id.value(),
        message: message.content.as_str().to_string(),
        timestamp: timestamp_to_rfc3339(millis),
        formatted_time: format_clock_time(millis, display_offset_minutes),
    }
}

fn room_full_text(room_id: &RoomId, max_users: usize) -> String {
    format!(
        "Room {} is full (max {} users). Please try another room.",
        room_id, max_users
    )
}

fn usernames(users: &[Username]) -> Vec<String> {
    users.iter().map(|u| u.as_str().to_string()).collect()
}

/// Encode a domain event as the JSON text frame sent to clients
pub fn encode_event(
    event: &ServerEvent,
    display_offset_minutes: i32,
) -> Result<String, serde_json::Error> {
    match event {
        ServerEvent::MessageHistory { room_id, messages } => {
            serde_json::to_string(&MessageHistoryEvent {
                method: EventMethod::MessageHistory,
                room_id: room_id.as_str().to_string(),
                messages: messages
                    .iter()
                    .map(|m| message_to_dto(m, display_offset_minutes))
                    .collect(),
                count: messages.len(),
            })
        }
        ServerEvent::NewMessage(message) => serde_json::to_string(&NewMessageEvent {
            method: EventMethod::NewMessage,
            room_id: message.room_id.as_str().to_string(),
            message: message_to_dto(message, display_offset_minutes),
        }),
        ServerEvent::RoomUsersUpdate { room_id, users } => {
            serde_json::to_string(&RoomUsersUpdateEvent {
                method: EventMethod::RoomUsersUpdate,
                room_id: room_id.as_str().to_string(),
                users: usernames(users),
            })
        }
        ServerEvent::UserPresence {
            room_id,
            user,
            status,
        } => serde_json::to_string(&UserPresenceEvent {
            method: EventMethod::UserPresence,
            room_id: room_id.as_str().to_string(),
            user: user.as_str().to_string(),
            status: status.as_str().to_string(),
        }),
        ServerEvent::Typing {
            room_id,
            user,
            is_typing,
        } => serde_json::to_string(&TypingEvent {
            method: EventMethod::Typing,
            room_id: room_id.as_str().to_string(),
            user: user.as_str().to_string(),
            is_typing: *is_typing,
        }),
        ServerEvent::RoomFull { room_id, max_users } => serde_json::to_string(&RoomFullEvent {
            method: EventMethod::RoomFull,
            room_id: room_id.as_str().to_string(),
            max_users: *max_users,
            message: room_full_text(room_id, *max_users),
        }),
        ServerEvent::AuthError { message } => serde_json::to_string(&AuthErrorEvent {
            method: EventMethod::AuthError,
            message: message.clone(),
        }),
    }
}
