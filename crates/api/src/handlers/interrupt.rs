use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct InterruptResponse {
    pub message: &'static str,
}

/// Unconditional acknowledgement; no generation is actually stopped.
///
/// The misspelling in the message is part of the wire contract and must
/// not be corrected.
pub async fn interrupt() -> Json<InterruptResponse> {
    tracing::info!("Interrupt requested");
    Json(InterruptResponse {
        message: "interrupt request recieved",
    })
}
