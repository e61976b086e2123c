pub mod convert;
pub mod health;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// /            liveness text (GET)
/// /health      service status JSON (GET)
/// /convert     upload and convert a document (POST)
/// ```
pub fn app_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(convert::router(config.max_upload_bytes))
}
