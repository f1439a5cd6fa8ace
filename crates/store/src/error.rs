use std::io;

/// Errors from the completion log layer.
///
/// Read and write failures are distinct variants because the HTTP surface
/// reports them with different bodies. A missing log file is not an error;
/// reads treat it as empty.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read log file: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write log file: {0}")]
    Write(#[source] io::Error),
}
