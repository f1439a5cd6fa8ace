//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use sdrelay_api::artifact::ArtifactFetcher;
use sdrelay_api::config::ServerConfig;
use sdrelay_api::router::build_app_router;
use sdrelay_api::state::AppState;
use sdrelay_api::ws::PeerRegistry;
use sdrelay_store::CompletionLog;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a fast poll interval so completion tests finish quickly.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_log: dir.path().join("requests.log"),
        poll_interval: Duration::from_millis(50),
        record_only: false,
    }
}

/// Build the full application router with all middleware layers.
///
/// Returns the state alongside the router so tests can reach the peer
/// registry and the completion log directly.
pub fn build_test_app(config: ServerConfig) -> (Router, AppState) {
    let state = AppState {
        config: Arc::new(config.clone()),
        peers: Arc::new(PeerRegistry::new()),
        log: Arc::new(CompletionLog::new(config.request_log.clone())),
        fetcher: ArtifactFetcher::new(),
        watch_cancel: tokio_util::sync::CancellationToken::new(),
    };
    let app = build_app_router(state.clone(), &config);
    (app, state)
}

/// Bind the app to an ephemeral local port and serve it in the background.
pub async fn serve_app(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
