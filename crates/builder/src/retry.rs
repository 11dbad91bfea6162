use reldb_config::RetryConfig;
use reldb_github::error::Result as LookupResult;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff for release lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never zero.
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}
impl RetryPolicy {
    /// A policy that tries once and never sleeps.
    pub const NONE: Self = Self {
        attempts: 1,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    /// Delay before retry number `retry` (1-based): `base * 2^(retry - 1)`,
    /// capped at `max_delay`.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent. The last error is returned.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> LookupResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LookupResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.attempts => {
                    let delay = self.delay(attempt);
                    tracing::debug!(attempt, delay_ms = delay.as_millis(), error = %err, "Retrying after transient error");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                Err(err) => return Err(err),
            }
        }
    }
}
impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}
