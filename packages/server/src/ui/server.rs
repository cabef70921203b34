//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::websocket_handler, heartbeat::spawn_heartbeat, signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(AppState::build(config));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the HTTP router. `/ws` is the only route.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket_handler))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the relay until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Agora relay listening on {}", listener.local_addr()?);

        let heartbeat = spawn_heartbeat(self.state.clone(), self.state.config.heartbeat_interval);
        let app = self.router();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        heartbeat.abort();
        result?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
