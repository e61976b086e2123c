//! End-to-end conversion of one staged file.
//!
//! [`ConversionRelay::convert`] runs the fixed job lifecycle:
//! create job → upload to the import form → poll → download the export.

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use winzaap_core::pipeline::conversion_job_payload;
use winzaap_core::polling::PollPolicy;

use crate::api::CloudConvertApi;
use crate::error::ConversionError;
use crate::poller::wait_for_job;

/// Upper bound on the best-effort delete of an abandoned job.
const DISCARD_TIMEOUT: Duration = Duration::from_secs(5);

/// The converted file, held in memory until it is sent to the client.
#[derive(Debug)]
pub struct ConvertedArtifact {
    /// Provider job that produced the artifact.
    pub job_id: String,
    pub bytes: Vec<u8>,
}

/// Drives conversion jobs against the provider.
pub struct ConversionRelay {
    api: CloudConvertApi,
    policy: PollPolicy,
    output_format: String,
}

impl ConversionRelay {
    pub fn new(api: CloudConvertApi, policy: PollPolicy, output_format: impl Into<String>) -> Self {
        Self {
            api,
            policy,
            output_format: output_format.into(),
        }
    }

    /// Convert the file at `path`, uploaded under `filename`.
    ///
    /// A job that times out or is cancelled is deleted on the provider
    /// side on a best-effort basis.
    pub async fn convert(
        &self,
        path: &Path,
        filename: &str,
        cancel: &CancellationToken,
    ) -> Result<ConvertedArtifact, ConversionError> {
        let job = self
            .api
            .create_job(&conversion_job_payload(&self.output_format))
            .await?;
        tracing::info!(job_id = %job.id, filename, "Created conversion job");

        let form = job.upload_form()?;
        self.api.upload_file(form, path, filename).await?;
        tracing::debug!(job_id = %job.id, "Upload accepted");

        let finished = match wait_for_job(&self.api, &job.id, &self.policy, cancel).await {
            Ok(finished) => finished,
            Err(err @ (ConversionError::Timeout { .. } | ConversionError::Cancelled { .. })) => {
                self.discard_job(&job.id).await;
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let export = finished.export_file()?;
        let bytes = self.api.download(&export.url).await?;
        tracing::info!(
            job_id = %finished.id,
            export_filename = export.filename.as_deref().unwrap_or(""),
            size = bytes.len(),
            "Downloaded converted file",
        );

        Ok(ConvertedArtifact {
            job_id: finished.id,
            bytes,
        })
    }

    async fn discard_job(&self, job_id: &str) {
        match tokio::time::timeout(DISCARD_TIMEOUT, self.api.delete_job(job_id)).await {
            Ok(Ok(())) => tracing::debug!(job_id, "Deleted abandoned conversion job"),
            Ok(Err(e)) => {
                tracing::warn!(job_id, error = %e, "Failed to delete abandoned conversion job");
            }
            Err(_) => tracing::warn!(job_id, "Timed out deleting abandoned conversion job"),
        }
    }
}
