//! Handler for the file conversion endpoint.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use winzaap_core::pipeline::{attachment_disposition, OUTPUT_CONTENT_TYPE};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::uploads::StagedUpload;

/// Multipart field carrying the document to convert.
pub const FILE_FIELD: &str = "file";

/// POST /convert
///
/// Accept a multipart upload with a `file` field, run it through the
/// conversion provider and return the PDF as `converted.pdf`.
///
/// The staged upload is removed before the response is returned,
/// whether the conversion succeeded or not.
pub async fn convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Request is not a multipart upload");
        AppError::MissingFile
    })?;

    let upload = stage_file_field(&state, &mut multipart).await?;

    let cancel = state.shutdown.child_token();
    let result = state
        .relay
        .convert(upload.path(), upload.original_name(), &cancel)
        .await;

    if let Err(e) = upload.remove().await {
        tracing::warn!(error = %e, "Failed to remove staged upload");
    }

    let artifact = result?;
    tracing::info!(job_id = %artifact.job_id, size = artifact.bytes.len(), "Returning converted file");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, OUTPUT_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment_disposition()),
        ],
        artifact.bytes,
    ))
}

/// Find the `file` field and persist it to the upload directory.
///
/// Fields with other names are skipped, as are `file` parts without a
/// filename (plain text fields are not uploads).
async fn stage_file_field(state: &AppState, multipart: &mut Multipart) -> AppResult<StagedUpload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            tracing::debug!("Skipping `file` field without a filename");
            continue;
        };

        let data = field.bytes().await.map_err(multipart_error)?;

        tracing::info!(filename = %filename, size = data.len(), "Received upload");

        return StagedUpload::persist(&state.config.upload_dir, Some(filename.as_str()), &data)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to stage upload: {e}")));
    }

    Err(AppError::MissingFile)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
