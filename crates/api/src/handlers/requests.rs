//! Recorded-job inspection and removal.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use sdrelay_core::Job;

use crate::error::AppResult;
use crate::state::AppState;

/// `GET /requests`: every job recorded in the log, in file order.
pub async fn list_requests(State(state): State<AppState>) -> AppResult<Json<Vec<Job>>> {
    let jobs = state.log.list_jobs().await?;
    Ok(Json(jobs))
}

#[derive(Debug, Deserialize)]
pub struct DeleteEntryRequest {
    /// Fingerprint tag of the entry to drop, as listed in the log.
    pub hash: String,
}

/// `POST /deleteEntry`: drop every log line containing the given tag.
pub async fn delete_entry(
    State(state): State<AppState>,
    Json(request): Json<DeleteEntryRequest>,
) -> AppResult<&'static str> {
    let removed = state.log.delete_by_tag(&request.hash).await?;
    tracing::info!(tag = %request.hash, removed, "Log entry deletion");
    Ok("Entry deleted")
}
