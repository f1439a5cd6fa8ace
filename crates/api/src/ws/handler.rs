//! WebSocket upgrade handling and per-peer connection lifecycle.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use sdrelay_store::CompletionLog;

use crate::state::AppState;
use crate::ws::manager::PeerRegistry;
use crate::ws::messages::parse_completion;

/// First text frame sent to every peer, confirming the duplex channel is
/// live.
pub const LIVENESS_GREETING: &str = "Connection established";

/// Upgrade an HTTP request into a peer WebSocket connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_peer(socket, state.peers, state.log))
}

async fn handle_peer(socket: WebSocket, peers: Arc<PeerRegistry>, log: Arc<CompletionLog>) {
    let peer_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(peer_id = %peer_id, "Peer connected");

    let mut rx = peers.add(peer_id.clone()).await;
    let (mut sink, mut stream) = socket.split();

    // Greet before wiring up the forwarding task so the greeting is always
    // the first frame the peer sees.
    if sink
        .send(Message::Text(LIVENESS_GREETING.into()))
        .await
        .is_err()
    {
        tracing::warn!(peer_id = %peer_id, "Peer dropped before the greeting was sent");
        peers.remove(&peer_id).await;
        return;
    }

    // Sender task: forward frames queued through the registry out to this
    // peer.
    let sender_peer_id = peer_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                tracing::debug!(peer_id = %sender_peer_id, "Peer sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound frames until the peer goes away.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_peer_text(&peer_id, &text, &log).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(peer_id = %peer_id, "Pong received");
            }
            Ok(_) => {
                // Binary and ping frames carry nothing we act on.
            }
            Err(e) => {
                tracing::debug!(peer_id = %peer_id, error = %e, "Peer receive error");
                break;
            }
        }
    }

    if let Some(handle) = peers.remove(&peer_id).await {
        let connected_secs = (chrono::Utc::now() - handle.connected_at).num_seconds();
        tracing::info!(peer_id = %peer_id, connected_secs, "Peer disconnected");
    }
    send_task.abort();
}

/// Record a peer-reported completion, ignoring frames that are not one.
async fn handle_peer_text(peer_id: &str, text: &str, log: &CompletionLog) {
    let event = match parse_completion(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(peer_id = %peer_id, error = %e, "Ignoring peer frame");
            return;
        }
    };

    match log.append(&event.image_url).await {
        Ok(()) => {
            tracing::info!(peer_id = %peer_id, locator = %event.image_url, "Completion recorded");
        }
        Err(e) => {
            tracing::error!(peer_id = %peer_id, error = %e, "Failed to record completion");
        }
    }
}
