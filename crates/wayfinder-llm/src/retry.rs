//! Jittered exponential backoff for in-place provider retries

use std::time::Duration;

use rand::Rng;

use crate::error::ProviderError;

/// Backoff schedule applied between retries of one provider
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries on top of the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles each retry after that
    pub initial_delay: Duration,
    /// Fraction of the delay randomized in either direction
    pub jitter_factor: f64,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            jitter_factor: 0.2,
        }
    }

    /// Whether the error allows another attempt at this provider
    pub const fn should_retry(&self, error: &ProviderError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }

    /// Delay before retry number `attempt` (0-based), jittered
    ///
    /// A rate-limit `retry_after` hint from the server overrides the
    /// computed backoff when it is longer.
    pub fn delay(&self, attempt: u32, error: &ProviderError) -> Duration {
        let exponential = self
            .initial_delay
            .saturating_mul(2_u32.saturating_pow(attempt));
        let jittered = add_jitter(exponential, self.jitter_factor);

        match error {
            ProviderError::RateLimited {
                retry_after: Some(seconds),
            } => jittered.max(Duration::from_secs(*seconds)),
            _ => jittered,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn add_jitter(delay: Duration, factor: f64) -> Duration {
    if factor <= 0.0 {
        return delay;
    }
    let base = delay.as_millis() as f64;
    let spread = base * factor;
    let jitter = rand::rng().random_range(-spread..=spread);
    Duration::from_millis((base + jitter).max(0.0) as u64)
}
