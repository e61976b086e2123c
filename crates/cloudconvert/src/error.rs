/// Errors from a conversion attempt against the remote provider.
///
/// Variants separate transport failures from failures the provider
/// reported itself, so the HTTP layer can map them to distinct statuses.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Conversion API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered, but not with what the pipeline expects.
    #[error("Malformed conversion API response: {0}")]
    MalformedResponse(String),

    /// The provider reported the job as failed.
    #[error("Conversion job {job_id} failed in task {task}: {message}")]
    JobFailed {
        job_id: String,
        task: String,
        message: String,
    },

    /// The job did not reach a terminal status within the poll budget.
    #[error("Conversion job {job_id} did not finish within {waited_secs}s")]
    Timeout { job_id: String, waited_secs: u64 },

    /// Polling was abandoned because the cancellation token fired.
    #[error("Conversion job {job_id} was cancelled")]
    Cancelled { job_id: String },

    /// The staged upload could not be read back from disk.
    #[error("Failed to read staged upload: {0}")]
    Io(#[from] std::io::Error),
}
