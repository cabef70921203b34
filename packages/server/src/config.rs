//! Runtime configuration of the relay.

use std::time::Duration;

use crate::domain::{DEFAULT_HISTORY_LIMIT, DEFAULT_ROOM_CAPACITY, RoomPolicy};

/// Development-only signing secret, used when none is configured
pub const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Display offset of `formattedTime` (UTC+10:00)
pub const DEFAULT_DISPLAY_UTC_OFFSET_MINUTES: i32 = 600;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub policy: RoomPolicy,
    pub heartbeat_interval: Duration,
    pub jwt_secret: String,
    /// Reject `join-room` without a token
    pub require_auth: bool,
    pub display_utc_offset_minutes: i32,
}

impl ServerConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            policy: RoomPolicy::new(DEFAULT_ROOM_CAPACITY, DEFAULT_HISTORY_LIMIT),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            require_auth: false,
            display_utc_offset_minutes: DEFAULT_DISPLAY_UTC_OFFSET_MINUTES,
        }
    }
}
