//! Room-based chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-server
//! cargo run --bin agora-server -- --host 0.0.0.0 --port 3000 --max-room-users 50
//! ```

use std::time::Duration;

use agora_server::{
    config::{DEV_JWT_SECRET, ServerConfig},
    domain::RoomPolicy,
    ui::{AppState, Server},
};
use agora_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "agora-server")]
#[command(about = "Room-based chat relay over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "AGORA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Maximum number of members per room
    #[arg(long, env = "MAX_ROOM_USERS", default_value = "100")]
    max_room_users: usize,

    /// Number of messages replayed on join (capped at 100)
    #[arg(long, env = "HISTORY_LIMIT", default_value = "50")]
    history_limit: usize,

    /// Seconds between heartbeat sweeps
    #[arg(long, env = "HEARTBEAT_INTERVAL_SECS", default_value = "30")]
    heartbeat_interval_secs: u64,

    /// Secret used to verify HS256 request tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    jwt_secret: String,

    /// Reject join-room requests without a token
    #[arg(long, env = "REQUIRE_AUTH")]
    require_auth: bool,

    /// UTC offset in minutes used for `formattedTime`
    #[arg(long, env = "DISPLAY_UTC_OFFSET_MINUTES", default_value = "600", allow_hyphen_values = true)]
    display_utc_offset_minutes: i32,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            policy: RoomPolicy::new(args.max_room_users, args.history_limit),
            heartbeat_interval: Duration::from_secs(args.heartbeat_interval_secs.max(1)),
            jwt_secret: args.jwt_secret,
            require_auth: args.require_auth,
            display_utc_offset_minutes: args.display_utc_offset_minutes,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());
    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET is not set, using the development secret");
    }
    tracing::info!(
        "Rooms: max {} users, {} messages of history; heartbeat every {:?}",
        config.policy.max_users,
        config.policy.history_limit,
        config.heartbeat_interval
    );

    let host = config.host.clone();
    let port = config.port;
    let server = Server::new(AppState::build(config));
    if let Err(e) = server.run(host, port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
