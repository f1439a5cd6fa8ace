use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use sdrelay_store::CompletionLog;

use crate::artifact::ArtifactFetcher;
use crate::config::ServerConfig;
use crate::ws::PeerRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Registry of connected peers (the duplex broadcast channel).
    pub peers: Arc<PeerRegistry>,
    /// The append-only completion log.
    pub log: Arc<CompletionLog>,
    /// HTTP client for fetching finished artifacts.
    pub fetcher: ArtifactFetcher,
    /// Master token; cancelled at shutdown to stop outstanding completion
    /// watches.
    pub watch_cancel: CancellationToken,
}
