//! Ordered provider failover
//!
//! Provider order is fixed at startup; a query makes at most one pass
//! through the list. Callers that see [`GatewayError::Unavailable`] are
//! expected to degrade, never to retry.

use std::sync::Arc;

use wayfinder_config::LlmConfig;
use wayfinder_core::QueryContext;
use wayfinder_observability::{Metrics, events};

use crate::error::GatewayError;
use crate::pool::{MIN_ATTEMPT, ProviderPool};
use crate::types::{LlmRequest, LlmResponse};

/// Walks the provider pool in configured order with fallback accounting
pub struct LlmGateway {
    pool: ProviderPool,
    metrics: Arc<Metrics>,
}

impl LlmGateway {
    pub fn from_config(config: &LlmConfig, metrics: Arc<Metrics>) -> Self {
        let pool = ProviderPool::from_config(config, Arc::clone(&metrics));
        Self { pool, metrics }
    }

    pub fn new(pool: ProviderPool, metrics: Arc<Metrics>) -> Self {
        Self { pool, metrics }
    }

    /// Whether a formatting call is worth attempting right now
    pub fn any_available(&self) -> bool {
        self.pool.any_available()
    }

    /// Complete against the first provider that answers
    ///
    /// Walks providers in configured order. A failover-triggering failure
    /// of provider N records one fallback event keyed
    /// `(from, to, error_class)` when provider N+1 is attempted; auth
    /// failures are skipped without counting. Providers are skipped when
    /// their circuit is open or the remaining deadline cannot fit a
    /// minimum attempt.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Unavailable`] once every provider has failed or
    /// been skipped.
    pub async fn complete(
        &self,
        request: &LlmRequest,
        ctx: &QueryContext,
    ) -> Result<LlmResponse, GatewayError> {
        // (failed provider id, error class) pending fallback accounting
        let mut pending_fallback: Option<(String, &'static str)> = None;

        for entry in self.pool.entries() {
            let Some(remaining) = ctx.remaining() else {
                break;
            };
            if remaining < MIN_ATTEMPT {
                break;
            }

            if !self.pool.health().is_available(entry.id()) {
                tracing::debug!(
                    correlation_id = %ctx.correlation_id(),
                    provider = entry.id(),
                    "skipping provider with open circuit"
                );
                continue;
            }

            if let Some((from_provider, error_class)) = pending_fallback.take() {
                self.metrics
                    .record_fallback(&from_provider, entry.id(), error_class);
                tracing::warn!(
                    correlation_id = %ctx.correlation_id(),
                    event = events::LLM_FALLBACK,
                    from_provider = %from_provider,
                    to_provider = entry.id(),
                    error_class,
                    "falling back to next provider"
                );
            }

            tracing::debug!(
                correlation_id = %ctx.correlation_id(),
                event = events::LLM_CALL,
                provider = entry.id(),
                remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                "attempting provider"
            );

            match self.pool.complete_entry(entry, request, remaining).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if error.triggers_failover() {
                        pending_fallback = Some((entry.id().to_owned(), error.class()));
                    } else {
                        tracing::warn!(
                            correlation_id = %ctx.correlation_id(),
                            provider = entry.id(),
                            error = %error,
                            "provider auth failure, skipping without fallback"
                        );
                    }
                }
            }
        }

        Err(GatewayError::Unavailable)
    }
}
