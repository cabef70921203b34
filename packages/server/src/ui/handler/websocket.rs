//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use super::router::{parse_request, route_request};
use crate::{
    domain::{ConnectionRegistry, OutboundFrame},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns the writer task of a connection.
///
/// Drains the connection's channel into the WebSocket sink until the channel
/// closes, a write fails, or a `Close` frame was written.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let closing = frame == OutboundFrame::Close;
            let message = match frame {
                OutboundFrame::Text(text) => Message::Text(text.into()),
                OutboundFrame::Ping => Message::Ping(Vec::new().into()),
                OutboundFrame::Close => Message::Close(None),
            };
            if sender.send(message).await.is_err() || closing {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive frames
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.connections.register(tx).await;
    tracing::info!("Connection '{}' opened", connection_id);

    let state_clone = state.clone();

    // Spawn a task to read requests from this connection, one at a time
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    state_clone.connections.mark_alive(&connection_id).await;
                    tracing::debug!("Received text from '{}': {}", connection_id, text);
                    if let Some(request) = parse_request(&text) {
                        route_request(&state_clone, connection_id, request).await;
                    }
                }
                Message::Pong(_) => {
                    state_clone.connections.mark_alive(&connection_id).await;
                }
                Message::Ping(_) => {
                    // Pong is sent automatically by the WebSocket protocol
                    tracing::debug!("Received ping from '{}'", connection_id);
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from '{}'", connection_id);
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
            }
        }
    });

    // Spawn a task to write queued frames to this connection
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_connection_usecase
        .execute(connection_id)
        .await;
}
