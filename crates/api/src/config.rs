use std::path::PathBuf;
use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `7860`, the port WebUI clients expect).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// The single value `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Path of the completion log file (default: `requests.log`).
    pub request_log: PathBuf,
    /// Interval between completion-log polls for a pending request.
    pub poll_interval: Duration,
    /// When set, `txt2img` records jobs to the log for later listing
    /// instead of waiting for a completion.
    pub record_only: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default        |
    /// |----------------------|----------------|
    /// | `HOST`               | `0.0.0.0`      |
    /// | `PORT`               | `7860`         |
    /// | `CORS_ORIGINS`       | `*`            |
    /// | `REQUEST_LOG`        | `requests.log` |
    /// | `POLL_INTERVAL_SECS` | `5`            |
    /// | `RECORD_ONLY`        | `false`        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "7860".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_log = PathBuf::from(
            std::env::var("REQUEST_LOG").unwrap_or_else(|_| "requests.log".into()),
        );

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        let record_only: bool = std::env::var("RECORD_ONLY")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("RECORD_ONLY must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_log,
            poll_interval: Duration::from_secs(poll_interval_secs),
            record_only,
        }
    }
}
