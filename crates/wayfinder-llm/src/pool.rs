//! Per-provider wrapper: total budget, in-place retries, health recording

use std::sync::Arc;
use std::time::{Duration, Instant};

use wayfinder_config::LlmConfig;
use wayfinder_observability::Metrics;

use crate::error::ProviderError;
use crate::health::HealthTracker;
use crate::provider::{ChatProvider, HttpChatProvider};
use crate::retry::RetryPolicy;
use crate::types::{LlmRequest, LlmResponse};

/// Smallest deadline slice worth spending on a provider attempt
pub const MIN_ATTEMPT: Duration = Duration::from_millis(100);

/// One provider plus its retry schedule and total budget
pub struct PooledProvider {
    provider: Arc<dyn ChatProvider>,
    /// Covers every attempt and backoff sleep for this provider
    budget: Duration,
    policy: RetryPolicy,
}

impl PooledProvider {
    pub fn new(provider: Arc<dyn ChatProvider>, budget: Duration, policy: RetryPolicy) -> Self {
        Self {
            provider,
            budget,
            policy,
        }
    }

    pub fn id(&self) -> &str {
        self.provider.id()
    }
}

/// Ordered set of pooled providers with shared health tracking
pub struct ProviderPool {
    entries: Vec<PooledProvider>,
    health: HealthTracker,
    metrics: Arc<Metrics>,
}

impl ProviderPool {
    /// Build HTTP providers from configuration, preserving order
    pub fn from_config(config: &LlmConfig, metrics: Arc<Metrics>) -> Self {
        let entries = config
            .providers
            .iter()
            .map(|provider_config| {
                PooledProvider::new(
                    Arc::new(HttpChatProvider::new(provider_config)),
                    Duration::from_millis(provider_config.timeout_ms),
                    RetryPolicy::new(
                        provider_config.max_retries,
                        Duration::from_millis(provider_config.backoff_initial_ms),
                    ),
                )
            })
            .collect();

        Self::new(entries, metrics)
    }

    pub fn new(entries: Vec<PooledProvider>, metrics: Arc<Metrics>) -> Self {
        Self {
            entries,
            health: HealthTracker::new(),
            metrics,
        }
    }

    pub fn entries(&self) -> &[PooledProvider] {
        &self.entries
    }

    pub const fn health(&self) -> &HealthTracker {
        &self.health
    }

    /// Whether any provider could currently serve a request
    pub fn any_available(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| self.health.is_available(entry.id()))
    }

    /// Run one provider to completion or terminal failure
    ///
    /// Retries timeouts and rate limits within the provider's budget,
    /// clipped to the caller's remaining deadline. The terminal error
    /// class is preserved for the gateway.
    ///
    /// # Errors
    ///
    /// Returns the last [`ProviderError`] once retries or budget run out.
    pub async fn complete_entry(
        &self,
        entry: &PooledProvider,
        request: &LlmRequest,
        deadline: Duration,
    ) -> Result<LlmResponse, ProviderError> {
        let budget = entry.budget.min(deadline);
        let start = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let remaining = budget.saturating_sub(start.elapsed());
            if remaining < MIN_ATTEMPT {
                return Err(ProviderError::Timeout);
            }

            let outcome = match tokio::time::timeout(remaining, entry.provider.complete(request, remaining)).await
            {
                Ok(inner) => inner,
                Err(_elapsed) => Err(ProviderError::Timeout),
            };

            match outcome {
                Ok(text) => {
                    self.health.record_success(entry.id());
                    self.metrics.record_provider_success(entry.id());
                    #[allow(clippy::cast_possible_truncation)]
                    let latency_ms = start.elapsed().as_millis() as u64;
                    return Ok(LlmResponse {
                        text,
                        provider_id: entry.id().to_owned(),
                        latency_ms,
                    });
                }
                Err(error) => {
                    self.health.record_failure(entry.id());
                    self.metrics.record_provider_failure(entry.id());

                    if !entry.policy.should_retry(&error, attempt) {
                        return Err(error);
                    }

                    let delay = entry.policy.delay(attempt, &error);
                    if start.elapsed() + delay + MIN_ATTEMPT > budget {
                        // Sleeping past the budget cannot help
                        return Err(error);
                    }

                    tracing::debug!(
                        provider = entry.id(),
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error_class = error.class(),
                        "retrying provider after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
