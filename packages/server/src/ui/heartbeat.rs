//! Heartbeat sweep.
//!
//! Every interval, connections that did not answer the previous probe are
//! closed and cleaned up as if they had disconnected; the rest are probed
//! again. A silent connection is gone within two intervals.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use super::state::AppState;
use crate::domain::ConnectionRegistry;

pub fn spawn_heartbeat(state: Arc<AppState>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_sweep(&state).await;
        }
    })
}

/// Run one sweep and return the number of connections cleaned up.
pub async fn run_sweep(state: &AppState) -> usize {
    let dead = state.connections.sweep().await;
    for connection_id in &dead {
        tracing::info!("Connection '{}' missed heartbeat, closing", connection_id);
        state
            .disconnect_connection_usecase
            .execute(*connection_id)
            .await;
    }
    dead.len()
}
