//! Registry of connected WebSocket peers.
//!
//! Every connected peer gets an unbounded channel; broadcasting a job means
//! pushing the same frame into each peer's channel. Send failures mean the
//! peer's receiving task is gone, so those peers are simply skipped and left
//! for the connection handler's cleanup path to remove.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;

use sdrelay_core::Job;

pub type PeerSender = UnboundedSender<Message>;

/// Per-peer bookkeeping held by the registry.
pub struct PeerHandle {
    pub sender: PeerSender,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

/// Shared registry of live peer connections, keyed by peer id.
pub struct PeerRegistry {
    peers: RwLock<HashMap<String, PeerHandle>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a peer and hand back the receiving end of its frame channel.
    ///
    /// Registering an id that is already present replaces the old handle;
    /// the stale sender is dropped and the old connection's forwarding task
    /// ends on its own.
    pub async fn add(&self, peer_id: String) -> UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = PeerHandle {
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.peers.write().await.insert(peer_id, handle);
        rx
    }

    pub async fn remove(&self, peer_id: &str) -> Option<PeerHandle> {
        self.peers.write().await.remove(peer_id)
    }

    pub async fn peer_count(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Send the same frame to every connected peer.
    ///
    /// Returns how many peers accepted the frame. Peers whose channel is
    /// closed are skipped.
    pub async fn broadcast(&self, message: Message) -> usize {
        let peers = self.peers.read().await;
        let mut delivered = 0;
        for handle in peers.values() {
            if handle.sender.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Broadcast a job as its canonical JSON text frame.
    pub async fn broadcast_job(&self, job: &Job) -> usize {
        self.broadcast(Message::Text(job.canonical_json().into()))
            .await
    }

    /// Queue a ping frame to every peer.
    pub async fn ping_all(&self) {
        let peers = self.peers.read().await;
        for handle in peers.values() {
            let _ = handle.sender.send(Message::Ping(Bytes::new()));
        }
    }

    /// Send a close frame to every peer and drop all handles.
    pub async fn shutdown_all(&self) {
        let mut peers = self.peers.write().await;
        for (peer_id, handle) in peers.iter() {
            tracing::debug!(peer_id = %peer_id, "Closing peer connection");
            let _ = handle.sender.send(Message::Close(None));
        }
        let count = peers.len();
        peers.clear();
        tracing::info!(count, "All peer connections closed");
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
