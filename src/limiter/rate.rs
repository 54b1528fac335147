// Shared rate limiter for the quota-limited document API.
// Spaces call starts by a cooldown and retries quota rejections with backoff.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::config::RateLimiterConfig;
use crate::error::{Result, SyncError};

use super::policy::RetryPolicy;

/// Serializes outbound calls with a minimum spacing between call starts.
///
/// One instance is meant to be constructed at startup and shared (via `Arc`)
/// by every consumer of the same external quota. Callers reserve start slots
/// in arrival order, so concurrent callers queue up behind each other.
#[derive(Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    call_timeout: Option<Duration>,
    policy: RetryPolicy,
    last_call_at: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given spacing and quota retry budget.
    pub fn new(cooldown: Duration, max_retries: u32) -> Self {
        Self {
            cooldown,
            call_timeout: None,
            policy: RetryPolicy::quota(max_retries),
            last_call_at: Mutex::new(None),
        }
    }

    /// Create a limiter from configuration.
    pub fn from_config(config: &RateLimiterConfig) -> Self {
        Self::new(config.cooldown(), config.max_retries).with_call_timeout(config.call_timeout())
    }

    /// Replace the retry policy applied to failed calls.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound each dispatched call with a hard timeout.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Minimum spacing between call starts.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Retry policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Start time of the most recently reserved call.
    pub fn last_call_at(&self) -> Option<Instant> {
        *self.last_call_at.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `call` under the limiter, retrying quota rejections.
    ///
    /// Errors that are not quota rejections, and the last quota rejection once
    /// retries are exhausted, are returned unchanged.
    pub async fn execute<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.policy
            .run("rate limited call", move || {
                let pending = call();
                async move {
                    self.acquire_slot().await;
                    self.dispatch(pending).await
                }
            })
            .await
    }

    /// Reserve the next start slot and wait for it.
    async fn acquire_slot(&self) {
        let slot = {
            let mut last = self
                .last_call_at
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = match *last {
                Some(prev) => now.max(prev + self.cooldown),
                None => now,
            };
            *last = Some(slot);
            slot
        };

        let now = Instant::now();
        if slot > now {
            debug!(
                wait_ms = (slot - now).as_millis() as u64,
                "waiting for rate limiter cooldown"
            );
            tokio::time::sleep_until(slot).await;
        }
    }

    async fn dispatch<T, Fut>(&self, call: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                SyncError::Timeout(format!("call exceeded {}s", limit.as_secs()))
            })?,
            None => call.await,
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimiterConfig::default())
    }
}
