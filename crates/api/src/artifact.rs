//! Artifact retrieval.
//!
//! Completion lines carry a locator URL; the completion watch fetches the
//! binary behind it and hands the caller a base64 rendition, the portable
//! form WebUI clients expect in `images`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Errors from artifact retrieval.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The artifact host answered with a non-2xx status.
    #[error("Artifact host returned {status} for {url}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// The locator that was fetched.
        url: String,
    },
}

/// HTTP client for fetching finished artifacts from their locators.
#[derive(Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl ArtifactFetcher {
    /// Create a fetcher with its own connection pool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the binary artifact at `url` and return it base64-encoded.
    pub async fn fetch_base64(&self, url: &str) -> Result<String, ArtifactError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtifactError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(BASE64.encode(&bytes))
    }
}

impl Default for ArtifactFetcher {
    fn default() -> Self {
        Self::new()
    }
}
