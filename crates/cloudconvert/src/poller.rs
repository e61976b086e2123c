//! Job-status polling with exponential backoff.
//!
//! [`wait_for_job`] re-fetches a job until it finishes, fails, runs out
//! of its [`PollPolicy`] budget, or the [`CancellationToken`] fires.

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use winzaap_core::polling::PollPolicy;

use crate::api::CloudConvertApi;
use crate::error::ConversionError;
use crate::job::{Job, Status};

/// Poll `job_id` until it reaches `finished`.
///
/// The first check happens immediately. A job reported as `error`
/// becomes [`ConversionError::JobFailed`]; exceeding the policy's
/// `max_wait` becomes [`ConversionError::Timeout`], including while a
/// status request is still waiting for an answer. Cancellation is
/// honoured both during a status request and while sleeping.
pub async fn wait_for_job(
    api: &CloudConvertApi,
    job_id: &str,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<Job, ConversionError> {
    let started = Instant::now();
    let deadline = started + policy.max_wait;
    let mut delay = policy.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(job_id, attempt)),
            result = tokio::time::timeout_at(deadline, api.get_job(job_id)) => match result {
                Ok(job) => job?,
                Err(_) => return Err(timed_out(job_id, attempt, policy, started)),
            },
        };

        match job.status {
            Status::Finished => {
                tracing::info!(
                    job_id,
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Conversion job finished",
                );
                return Ok(job);
            }
            Status::Error => {
                let err = job.failure();
                tracing::warn!(job_id, attempt, error = %err, "Conversion job failed");
                return Err(err);
            }
            status => {
                tracing::debug!(job_id, attempt, ?status, "Conversion job still running");
            }
        }

        let Some(sleep_for) = policy.sleep_within_budget(delay, started.elapsed()) else {
            return Err(timed_out(job_id, attempt, policy, started));
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(job_id, attempt)),
            _ = tokio::time::sleep(sleep_for) => {}
        }

        delay = policy.next_delay(delay);
    }
}

fn timed_out(job_id: &str, attempt: u32, policy: &PollPolicy, started: Instant) -> ConversionError {
    tracing::warn!(
        job_id,
        attempt,
        max_wait_secs = policy.max_wait.as_secs(),
        "Conversion job exceeded poll budget",
    );
    ConversionError::Timeout {
        job_id: job_id.to_string(),
        waited_secs: started.elapsed().as_secs(),
    }
}

fn cancelled(job_id: &str, attempt: u32) -> ConversionError {
    tracing::info!(job_id, attempt, "Conversion polling cancelled");
    ConversionError::Cancelled {
        job_id: job_id.to_string(),
    }
}
