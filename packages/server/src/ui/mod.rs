//! WebSocket relay server.

mod handler;
mod heartbeat;
mod server;
mod signal;
pub mod state;

pub use heartbeat::{run_sweep, spawn_heartbeat};
pub use server::Server;
pub use signal::shutdown_signal;
pub use state::AppState;
