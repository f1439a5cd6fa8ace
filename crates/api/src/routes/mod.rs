//! Route tree assembly.
//!
//! ```text
//! /                      GET   WebSocket upgrade for peers
//! /health                GET   liveness probe
//! /requests              GET   list recorded jobs
//! /deleteEntry           POST  drop log lines carrying a fingerprint tag
//! /sdapi/v1/txt2img      POST  submit a job, wait for a completion
//! /sdapi/v1/interrupt    POST  acknowledge an interrupt request
//! ```
//!
//! `OPTIONS` never reaches this tree; the CORS layer answers it and the
//! preflight middleware in [`crate::router`] pins the status to 204.

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generate, interrupt, requests};
use crate::state::AppState;
use crate::ws;

pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ws::ws_handler))
        .merge(health::router())
        .nest("/sdapi/v1", sdapi_routes())
        .route("/requests", get(requests::list_requests))
        .route("/deleteEntry", post(requests::delete_entry))
}

fn sdapi_routes() -> Router<AppState> {
    Router::new()
        .route("/txt2img", post(generate::txt2img))
        .route("/interrupt", post(interrupt::interrupt))
}
