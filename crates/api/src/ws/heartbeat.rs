//! Periodic keepalive pings for peer connections.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::ws::manager::PeerRegistry;

const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn the heartbeat loop. Abort the returned handle on shutdown.
pub fn start_heartbeat(peers: Arc<PeerRegistry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let count = peers.peer_count().await;
            if count > 0 {
                tracing::debug!(count, "Peer heartbeat ping");
                peers.ping_all().await;
            }
        }
    })
}
