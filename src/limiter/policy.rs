// Retry policy value object.
// Describes how many times to retry, how long to wait, and which errors qualify.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::{Result, SyncError};

/// Upper bound for any single backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Which class of error a policy retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOn {
    /// HTTP 429 / resource-exhausted rejections.
    Quota,
    /// Network errors and timeouts.
    Transient,
}

/// Bounded retry policy with exponential backoff and optional jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied per attempt (1 = fixed delay).
    pub multiplier: u32,
    /// Cap applied before jitter is added.
    pub max_delay: Duration,
    /// Random extra delay drawn from `0..=jitter`.
    pub jitter: Duration,
    /// Error class this policy retries.
    pub retry_on: RetryOn,
}

impl RetryPolicy {
    /// Document-API quota policy: 3s, 6s, 12s, 24s, 48s plus up to 2s of jitter.
    pub fn quota(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(3000),
            multiplier: 2,
            max_delay: MAX_BACKOFF,
            jitter: Duration::from_millis(2000),
            retry_on: RetryOn::Quota,
        }
    }

    /// Network/timeout policy with doubling delay and no jitter.
    pub fn transient(initial_delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay,
            multiplier: 2,
            max_delay: MAX_BACKOFF,
            jitter: Duration::ZERO,
            retry_on: RetryOn::Transient,
        }
    }

    /// Fixed-delay quota policy.
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: delay,
            multiplier: 1,
            max_delay: MAX_BACKOFF,
            jitter: Duration::ZERO,
            retry_on: RetryOn::Quota,
        }
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Deterministic part of the delay for a zero-based retry attempt.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1).saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay to wait before retry `attempt`, jittered and capped at `MAX_BACKOFF`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            let ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
            Duration::from_millis(ms)
        };
        (self.base_delay(attempt) + jitter).min(MAX_BACKOFF)
    }

    /// Whether `err` belongs to the class this policy retries.
    pub fn is_retryable(&self, err: &SyncError) -> bool {
        match self.retry_on {
            RetryOn::Quota => err.is_quota(),
            RetryOn::Transient => err.is_transient(),
        }
    }

    /// Whether retry number `attempt` (zero-based) is still allowed for `err`.
    pub fn should_retry(&self, attempt: u32, err: &SyncError) -> bool {
        attempt < self.max_retries && self.is_retryable(err)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or retries run out.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(attempt, &err) => {
                    let delay = self.backoff(attempt);
                    warn!(
                        label,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::quota(5)
    }
}
