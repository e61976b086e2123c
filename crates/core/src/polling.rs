//! Poll scheduling for remote conversion jobs.
//!
//! The relay re-checks a job's status with exponentially growing delays
//! and gives up once the total wait exceeds [`PollPolicy::max_wait`].
//! This module holds only the arithmetic; the loop itself lives in the
//! provider client crate.

use std::time::Duration;

use crate::error::CoreError;

/// Tunable parameters for job-status polling.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the second status check.
    pub initial_delay: Duration,
    /// Upper bound on the delay between checks.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each non-terminal check.
    pub multiplier: f64,
    /// Total time budget for a single job.
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
            multiplier: 1.5,
            max_wait: Duration::from_secs(300),
        }
    }
}

impl PollPolicy {
    /// Build a policy, rejecting values that would spin or never back off.
    pub fn new(
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
        max_wait: Duration,
    ) -> Result<Self, CoreError> {
        if initial_delay.is_zero() {
            return Err(CoreError::Validation(
                "poll interval must be greater than zero".into(),
            ));
        }
        if max_delay < initial_delay {
            return Err(CoreError::Validation(format!(
                "poll max delay ({}ms) must not be below the poll interval ({}ms)",
                max_delay.as_millis(),
                initial_delay.as_millis()
            )));
        }
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(CoreError::Validation(format!(
                "poll backoff multiplier must be >= 1.0, got {multiplier}"
            )));
        }
        if max_wait.is_zero() {
            return Err(CoreError::Validation(
                "poll max wait must be greater than zero".into(),
            ));
        }

        Ok(Self {
            initial_delay,
            max_delay,
            multiplier,
            max_wait,
        })
    }

    /// Calculate the delay that follows `current`, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }

    /// How long to sleep before the next check given the time already spent.
    ///
    /// Returns `None` once the budget is exhausted. Otherwise the delay is
    /// shortened so the last check lands on the deadline instead of past it.
    pub fn sleep_within_budget(&self, delay: Duration, elapsed: Duration) -> Option<Duration> {
        let remaining = self.max_wait.checked_sub(elapsed)?;
        if remaining.is_zero() {
            return None;
        }
        Some(delay.min(remaining))
    }
}
