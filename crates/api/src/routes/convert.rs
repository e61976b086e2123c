use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Mount the conversion route with its own body limit (uploads are
/// larger than axum's 2 MB default).
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/convert", post(handlers::convert::convert))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
