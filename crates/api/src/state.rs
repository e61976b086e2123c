use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use winzaap_cloudconvert::api::CloudConvertApi;
use winzaap_cloudconvert::relay::ConversionRelay;
use winzaap_core::pipeline::OUTPUT_FORMAT;

use crate::config::ServerConfig;

/// Per-request limit for calls to the conversion provider.
const PROVIDER_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Conversion provider driver (owns the pooled HTTP client).
    pub relay: Arc<ConversionRelay>,
    /// Cancelled on graceful shutdown; in-flight conversions poll against
    /// child tokens of this one.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build state from configuration, creating the provider HTTP client.
    pub fn new(config: ServerConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("winzaap-api/", env!("CARGO_PKG_VERSION")))
            .timeout(PROVIDER_REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");

        let api = CloudConvertApi::with_client(
            client,
            config.cloudconvert.api_url.clone(),
            config.cloudconvert.api_key.clone(),
        );
        let relay = ConversionRelay::new(api, config.poll.clone(), OUTPUT_FORMAT);

        Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
            shutdown: CancellationToken::new(),
        }
    }
}
