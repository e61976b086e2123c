use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use winzaap_core::polling::PollPolicy;

/// Default CloudConvert API base URL (v2).
pub const DEFAULT_CLOUDCONVERT_API_URL: &str = "https://api.cloudconvert.com/v2";

/// Server configuration loaded from environment variables.
///
/// Built once at startup and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `360`). Must exceed the
    /// poll budget or long conversions are cut off with 408.
    pub request_timeout_secs: u64,
    /// Maximum accepted request body size in bytes (default: 100 MiB).
    pub max_upload_bytes: usize,
    /// Directory uploads are staged in while a conversion runs.
    pub upload_dir: PathBuf,
    /// Conversion provider endpoint and credential.
    pub cloudconvert: CloudConvertConfig,
    /// Job-status polling schedule.
    pub poll: PollPolicy,
}

/// Conversion provider settings.
#[derive(Clone)]
pub struct CloudConvertConfig {
    /// Base URL including the API version.
    pub api_url: String,
    /// Bearer credential.
    pub api_key: String,
}

impl fmt::Debug for CloudConvertConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudConvertConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl CloudConvertConfig {
    /// | Env Var                | Default                           |
    /// |------------------------|-----------------------------------|
    /// | `CLOUDCONVERT_API_KEY` | required                          |
    /// | `CLOUDCONVERT_API_URL` | `https://api.cloudconvert.com/v2` |
    pub fn from_env() -> Self {
        let api_key =
            std::env::var("CLOUDCONVERT_API_KEY").expect("CLOUDCONVERT_API_KEY must be set");

        let api_url = std::env::var("CLOUDCONVERT_API_URL")
            .unwrap_or_else(|_| DEFAULT_CLOUDCONVERT_API_URL.into());

        Self { api_url, api_key }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default      |
    /// |--------------------------|--------------|
    /// | `HOST`                   | `0.0.0.0`    |
    /// | `PORT`                   | `5000`       |
    /// | `CORS_ORIGINS`           | `*`          |
    /// | `REQUEST_TIMEOUT_SECS`   | `360`        |
    /// | `MAX_UPLOAD_BYTES`       | `104857600`  |
    /// | `UPLOAD_DIR`             | `uploads`    |
    /// | `POLL_INTERVAL_SECS`     | `2`          |
    /// | `POLL_MAX_DELAY_SECS`    | `10`         |
    /// | `POLL_BACKOFF_MULTIPLIER`| `1.5`        |
    /// | `POLL_MAX_WAIT_SECS`     | `300`        |
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", 5000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 360);
        let max_upload_bytes: usize = env_or("MAX_UPLOAD_BYTES", 100 * 1024 * 1024);

        let upload_dir = PathBuf::from(
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
        );

        let defaults = PollPolicy::default();
        let poll = PollPolicy::new(
            Duration::from_secs(env_or("POLL_INTERVAL_SECS", defaults.initial_delay.as_secs())),
            Duration::from_secs(env_or("POLL_MAX_DELAY_SECS", defaults.max_delay.as_secs())),
            env_or("POLL_BACKOFF_MULTIPLIER", defaults.multiplier),
            Duration::from_secs(env_or("POLL_MAX_WAIT_SECS", defaults.max_wait.as_secs())),
        )
        .unwrap_or_else(|e| panic!("Invalid poll configuration: {e}"));

        let cloudconvert = CloudConvertConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            upload_dir,
            cloudconvert,
            poll,
        }
    }

    /// Whether CORS is configured to accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Read and parse an env var, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
