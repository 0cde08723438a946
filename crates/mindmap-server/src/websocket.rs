//! WebSocket transport for the session protocol

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::{Request, Response};
use crate::ServerState;

/// Handle WebSocket upgrade requests
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
///
/// Each request runs in its own task so a newer analysis can supersede one
/// still in flight. Replies funnel through one channel into the socket.
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!("Received WebSocket message: {}", text);
                    let state = Arc::clone(&state);
                    let reply_tx = reply_tx.clone();
                    tokio::spawn(async move {
                        for reply in handle_text(&state, &text).await {
                            if reply_tx.send(reply).is_err() {
                                break;
                            }
                        }
                    });
                }
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(reply) = reply_rx.recv().await {
            if sender.send(Message::Text(reply)).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("WebSocket connection closed");
}

/// Decode one text frame, run it against the session and encode the replies.
pub async fn handle_text(state: &ServerState, text: &str) -> Vec<String> {
    let responses = match serde_json::from_str::<Request>(text) {
        Ok(request) => state.session.handle(request).await,
        Err(e) => {
            warn!("Failed to parse WebSocket message: {}", e);
            vec![Response::error(0, format!("malformed request: {}", e))]
        }
    };

    responses
        .iter()
        .filter_map(|response| match serde_json::to_string(response) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("Failed to serialize response #{}: {}", response.generation(), e);
                None
            }
        })
        .collect()
}
