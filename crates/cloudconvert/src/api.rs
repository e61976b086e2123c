//! REST API client for the CloudConvert v2 endpoints.
//!
//! Wraps job creation, status lookup, job deletion, the signed upload
//! form, and the final export download using [`reqwest`].

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::error::ConversionError;
use crate::job::{form_value_text, Job, JobEnvelope, UploadForm};

/// HTTP client for the CloudConvert API.
pub struct CloudConvertApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl CloudConvertApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base URL including the version, e.g. `https://api.cloudconvert.com/v2`.
    /// * `api_key` - Bearer credential sent on every `/jobs` request.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Base URL requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Create a job from a task graph.
    ///
    /// Sends `POST /jobs` and returns the created job descriptor, whose
    /// import task carries the upload form.
    pub async fn create_job(&self, tasks: &serde_json::Value) -> Result<Job, ConversionError> {
        let response = self
            .client
            .post(format!("{}/jobs", self.api_url))
            .bearer_auth(&self.api_key)
            .json(tasks)
            .send()
            .await?;

        Self::parse_job(response).await
    }

    /// Fetch the current state of a job via `GET /jobs/{id}`.
    pub async fn get_job(&self, job_id: &str) -> Result<Job, ConversionError> {
        let response = self
            .client
            .get(format!("{}/jobs/{}", self.api_url, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::parse_job(response).await
    }

    /// Delete a job and its files via `DELETE /jobs/{id}`.
    pub async fn delete_job(&self, job_id: &str) -> Result<(), ConversionError> {
        let response = self
            .client
            .delete(format!("{}/jobs/{}", self.api_url, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Submit a staged file to an import task's upload form.
    ///
    /// All form parameters are sent as text fields ahead of the `file`
    /// part, which is streamed from disk. The response body is not
    /// inspected beyond its status.
    pub async fn upload_file(
        &self,
        form: &UploadForm,
        path: &Path,
        filename: &str,
    ) -> Result<(), ConversionError> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let mut multipart = Form::new();
        for (key, value) in &form.parameters {
            multipart = multipart.text(key.clone(), form_value_text(value));
        }
        multipart = multipart.part(
            "file",
            Part::stream_with_length(body, size).file_name(filename.to_string()),
        );

        tracing::debug!(url = %form.url, size, "Uploading file to conversion provider");

        let response = self
            .client
            .post(&form.url)
            .multipart(multipart)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Download an exported file. Export URLs are pre-signed, so no
    /// credential is attached.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, ConversionError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ConversionError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ConversionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ConversionError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful `{"data": job}` response body.
    async fn parse_job(response: reqwest::Response) -> Result<Job, ConversionError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        let envelope: JobEnvelope = serde_json::from_str(&body)
            .map_err(|e| ConversionError::MalformedResponse(format!("invalid job descriptor: {e}")))?;
        Ok(envelope.data)
    }
}
