//! Test fixtures: an in-process relay bound to an ephemeral port and a
//! WebSocket client speaking its JSON protocol.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use agora_server::{
    config::ServerConfig,
    ui::{AppState, Server},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};

pub const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Relay running inside the test runtime
pub struct TestServer {
    addr: SocketAddr,
    pub state: Arc<AppState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let server = Server::new(AppState::build(config));
        let state = server.state();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = server.serve(listener, shutdown).await {
                eprintln!("test server error: {}", e);
            }
        });

        TestServer {
            addr,
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// WebSocket client for a `TestServer`
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl TestClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _response) = connect_async(server.url())
            .await
            .expect("Failed to connect to test server");
        TestClient { stream }
    }

    pub async fn send_json(&mut self, value: Value) {
        self.send_text(&value.to_string()).await;
    }

    pub async fn send_text(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("Failed to send frame");
    }

    /// Send `join-room` and wait for the two frames every joiner receives:
    /// `message-history` and `room-users-update`
    pub async fn join(&mut self, room: &str, username: &str) -> (Value, Value) {
        self.send_json(json!({"method": "join-room", "room": room, "username": username}))
            .await;
        let history = self.recv_method("message-history").await;
        let users = self.recv_method("room-users-update").await;
        (history, users)
    }

    pub async fn send_message(&mut self, room: &str, message: &str) {
        self.send_json(json!({"method": "send-message", "room": room, "message": message}))
            .await;
    }

    /// Next JSON event; control frames are skipped
    pub async fn recv_event(&mut self) -> Value {
        self.try_recv_event(RECV_TIMEOUT)
            .await
            .expect("Timed out waiting for an event")
    }

    /// Next event, asserting its method
    pub async fn recv_method(&mut self, method: &str) -> Value {
        let event = self.recv_event().await;
        assert_eq!(event["method"], method, "unexpected event: {}", event);
        event
    }

    pub async fn try_recv_event(&mut self, timeout: Duration) -> Option<Value> {
        let read = async {
            while let Some(frame) = self.stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        return Some(
                            serde_json::from_str::<Value>(text.as_str())
                                .expect("Server sent invalid JSON"),
                        );
                    }
                    Ok(Message::Close(_)) | Err(_) => return None,
                    Ok(_) => continue,
                }
            }
            None
        };
        tokio::time::timeout(timeout, read).await.ok().flatten()
    }

    /// Assert that nothing arrives within `timeout`
    pub async fn expect_no_event(&mut self, timeout: Duration) {
        if let Some(event) = self.try_recv_event(timeout).await {
            panic!("Expected no event, got {}", event);
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
