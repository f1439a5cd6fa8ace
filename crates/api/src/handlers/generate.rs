//! Job submission.
//!
//! `POST /sdapi/v1/txt2img` takes a job, applies the prompt rewrites,
//! relays it to every connected peer, and holds the response open until a
//! peer-reported completion is consumed from the log.
//!
//! With `RECORD_ONLY` set the relay wait is skipped: the job is
//! deduplicated against the log, recorded as a tagged entry, still
//! broadcast, and answered immediately with an empty image list.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use sdrelay_core::{dedup, prompt, Job};

use crate::error::{AppError, AppResult};
use crate::poller::{spawn_completion_watch, WatchOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub images: Vec<String>,
}

pub async fn txt2img(
    State(state): State<AppState>,
    Json(mut job): Json<Job>,
) -> AppResult<Json<GenerateResponse>> {
    prompt::apply_rewrites(&mut job);
    let tag = dedup::fingerprint_tag(&job);
    tracing::info!(tag = %tag, "Job submitted");

    if state.config.record_only {
        return record_job(&state, &job, &tag).await;
    }

    let delivered = state.peers.broadcast_job(&job).await;
    tracing::info!(delivered, "Job relayed to peers");

    let rx = spawn_completion_watch(
        Arc::clone(&state.log),
        state.fetcher.clone(),
        state.config.poll_interval,
        state.watch_cancel.child_token(),
    );

    match rx.await {
        Ok(WatchOutcome::Resolved { images }) => Ok(Json(GenerateResponse { images })),
        Ok(WatchOutcome::Failed(reason)) => Err(AppError::Processing(reason)),
        Err(_) => Err(AppError::Processing(
            "completion watch ended before resolving".into(),
        )),
    }
}

/// Record-only path: dedup against the log instead of waiting on a peer.
async fn record_job(state: &AppState, job: &Job, tag: &str) -> AppResult<Json<GenerateResponse>> {
    let corpus = state.log.read_all().await?;
    if dedup::is_duplicate(job, &corpus) {
        tracing::info!(tag = %tag, "Duplicate job skipped");
    } else {
        state.log.record_job(job).await?;
        tracing::info!(tag = %tag, "Job recorded");
    }

    let delivered = state.peers.broadcast_job(job).await;
    tracing::info!(delivered, "Job relayed to peers");

    Ok(Json(GenerateResponse { images: Vec::new() }))
}
