//! Bounded retry of storage-transient failures.

use std::future::Future;
use std::time::Duration;

use strata_core::AppResult;
use tokio::time::sleep;
use tracing::warn;

const INITIAL_DELAY: Duration = Duration::from_millis(50);
const MAX_DELAY: Duration = Duration::from_secs(1);

/// Retries an operation while it fails with `AppError::Transient`.
///
/// Every other outcome, success or error, is returned after the first attempt
/// that produces it.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Exponential backoff starting at 50ms, doubling up to one second.
    pub fn new(max_attempts: u32) -> Self {
        Self::with_delays(max_attempts, INITIAL_DELAY, MAX_DELAY)
    }

    pub fn with_delays(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    /// Delay before the retry that follows the given failed attempt (1-based).
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(failed_attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Err(error) if error.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        operation,
                        attempt,
                        ?delay,
                        %error,
                        "transient failure, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}
