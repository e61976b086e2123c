use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use winzaap_cloudconvert::ConversionError;

/// Message returned when a `/convert` request carries no `file` field.
pub const MISSING_FILE_MESSAGE: &str = "No file uploaded";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`ConversionError`] for provider failures and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{"error": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request has no multipart field named `file`.
    #[error("No file uploaded")]
    MissingFile,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The upload exceeds the configured body limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The conversion provider round trip failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "MISSING_FILE",
                MISSING_FILE_MESSAGE.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }

            // --- Provider errors ---
            AppError::Conversion(err) => classify_conversion_error(err),

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a provider error into an HTTP status, error code, and message.
///
/// - Transport failures map to 500 with the underlying error text.
/// - Anything the provider itself reported (error status, bad payload,
///   failed job) maps to 502.
/// - An exhausted poll budget maps to 504, shutdown cancellation to 503.
/// - Local I/O failures map to 500 with a sanitized message.
fn classify_conversion_error(err: &ConversionError) -> (StatusCode, &'static str, String) {
    let (status, code) = match err {
        ConversionError::Transport(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TRANSPORT_ERROR"),
        ConversionError::Api { .. } => (StatusCode::BAD_GATEWAY, "REMOTE_API_ERROR"),
        ConversionError::MalformedResponse(_) => (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE"),
        ConversionError::JobFailed { .. } => (StatusCode::BAD_GATEWAY, "JOB_FAILED"),
        ConversionError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "CONVERSION_TIMEOUT"),
        ConversionError::Cancelled { .. } => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
        ConversionError::Io(io_err) => {
            tracing::error!(error = %io_err, "Staged upload I/O error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            );
        }
    };

    tracing::error!(error = %err, code, "Conversion failed");
    (status, code, err.to_string())
}
