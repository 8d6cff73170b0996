use crate::overlay::{OverlayAppState, OverlayEvent};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{Sink, SinkExt, StreamExt};
use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub overlay: OverlayAppState,
    /// Open WebSocket connections
    pub connections: Arc<AtomicUsize>,
    next_connection_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(overlay: OverlayAppState) -> Self {
        Self {
            overlay,
            connections: Arc::new(AtomicUsize::new(0)),
            next_connection_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Stream overlay events to one client.
///
/// The client first receives the current image and its waypoints, then every
/// event published after that.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = state.next_connection_id.fetch_add(1, Ordering::Relaxed);
    state.connections.fetch_add(1, Ordering::Relaxed);
    metrics::gauge!("gridmark_ws_connections_active").increment(1.0);
    info!("New WebSocket connection: {}", connection_id);

    // Subscribe under the lock so nothing lands between snapshot and stream
    let (snapshot, mut events) = {
        let controller = state.overlay.controller.lock().await;
        (controller.snapshot_events(), controller.subscribe())
    };

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        for event in snapshot {
            if !send_event(&mut ws_sender, &event).await {
                return;
            }
        }

        loop {
            match events.recv().await {
                Ok(event) => {
                    if !send_event(&mut ws_sender, &event).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Connection {} lagged, {} events dropped",
                        connection_id, skipped
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                info!("Client {} requested close", connection_id);
                break;
            }
            Ok(Message::Text(text)) => {
                // The stream is one-way; commands go through the HTTP API
                debug!("Ignoring text frame from {}: {}", connection_id, text);
            }
            Ok(_) => {}
            Err(e) => {
                error!("WebSocket error for {}: {}", connection_id, e);
                break;
            }
        }
    }

    send_task.abort();
    state.connections.fetch_sub(1, Ordering::Relaxed);
    metrics::gauge!("gridmark_ws_connections_active").decrement(1.0);
    info!("WebSocket connection closed: {}", connection_id);
}

/// Serialize and send one event; false once the client is gone
async fn send_event<S>(sender: &mut S, event: &OverlayEvent) -> bool
where
    S: Sink<Message> + Unpin,
{
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize event: {}", e);
            true
        }
    }
}
