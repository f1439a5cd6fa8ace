use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sdrelay_store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce the plain-text error bodies the
/// relay's clients expect; the diagnostic detail goes to the log instead of
/// the wire.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A completion log failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The relay flow failed for the current response (artifact fetch or
    /// log access inside the completion watch).
    #[error("Request processing failed: {0}")]
    Processing(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Store(StoreError::Read(e)) => {
                tracing::error!(error = %e, "Log read failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error reading file")
            }
            AppError::Store(StoreError::Write(e)) => {
                tracing::error!(error = %e, "Log write failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error writing file")
            }
            AppError::Processing(reason) => {
                tracing::error!(error = %reason, "Request processing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error processing request")
            }
        };

        (status, body).into_response()
    }
}
