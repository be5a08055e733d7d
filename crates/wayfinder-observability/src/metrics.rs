//! In-process metrics registry
//!
//! Shared mutable state is confined to dashmap counters and the latency
//! ring; every increment is O(1) and safe under concurrent writers.

use std::collections::BTreeMap;

use dashmap::DashMap;
use wayfinder_core::{Intent, RefusalReason};

use crate::latency::{LatencyPercentiles, LatencyWindow};

/// Key for the gateway fallback counter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FallbackKey {
    pub from_provider: String,
    pub to_provider: String,
    pub error_class: String,
}

/// Per-provider outcome counters
#[derive(Debug, Default, Clone, Copy)]
struct ProviderOutcomes {
    success: u64,
    failure: u64,
}

/// Registry of rolling counters and the latency window
#[derive(Debug)]
pub struct Metrics {
    queries_total: DashMap<Intent, u64>,
    denials: DashMap<RefusalReason, u64>,
    providers: DashMap<String, ProviderOutcomes>,
    fallbacks: DashMap<FallbackKey, u64>,
    latency: LatencyWindow,
}

impl Metrics {
    pub fn new(latency_window_size: usize) -> Self {
        Self {
            queries_total: DashMap::new(),
            denials: DashMap::new(),
            providers: DashMap::new(),
            fallbacks: DashMap::new(),
            latency: LatencyWindow::new(latency_window_size),
        }
    }

    pub fn record_query(&self, intent: Intent) {
        *self.queries_total.entry(intent).or_insert(0) += 1;
    }

    pub fn record_refusal(&self, reason: RefusalReason) {
        *self.denials.entry(reason).or_insert(0) += 1;
    }

    pub fn record_provider_success(&self, provider_id: &str) {
        self.providers
            .entry(provider_id.to_owned())
            .or_default()
            .success += 1;
    }

    pub fn record_provider_failure(&self, provider_id: &str) {
        self.providers
            .entry(provider_id.to_owned())
            .or_default()
            .failure += 1;
    }

    /// Count one fallback hop keyed by `(from, to, error_class)`
    pub fn record_fallback(&self, from_provider: &str, to_provider: &str, error_class: &str) {
        let key = FallbackKey {
            from_provider: from_provider.to_owned(),
            to_provider: to_provider.to_owned(),
            error_class: error_class.to_owned(),
        };
        *self.fallbacks.entry(key).or_insert(0) += 1;
    }

    pub fn record_latency(&self, latency_ms: u64) {
        self.latency.record(latency_ms);
    }

    /// Current fallback count for a specific hop and error class
    pub fn fallback_count(&self, from_provider: &str, to_provider: &str, error_class: &str) -> u64 {
        let key = FallbackKey {
            from_provider: from_provider.to_owned(),
            to_provider: to_provider.to_owned(),
            error_class: error_class.to_owned(),
        };
        self.fallbacks.get(&key).map_or(0, |count| *count)
    }

    pub fn refusal_count(&self, reason: RefusalReason) -> u64 {
        self.denials.get(&reason).map_or(0, |count| *count)
    }

    pub fn provider_success_count(&self, provider_id: &str) -> u64 {
        self.providers.get(provider_id).map_or(0, |o| o.success)
    }

    /// Copy-out snapshot for the metrics endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        let queries_by_intent: BTreeMap<String, u64> = self
            .queries_total
            .iter()
            .map(|entry| (entry.key().to_string(), *entry.value()))
            .collect();
        let total_queries: u64 = queries_by_intent.values().sum();

        let denials_by_reason: BTreeMap<String, u64> = self
            .denials
            .iter()
            .map(|entry| (entry.key().to_string(), *entry.value()))
            .collect();
        let total_denials: u64 = denials_by_reason.values().sum();

        let providers: BTreeMap<String, ProviderSnapshot> = self
            .providers
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    ProviderSnapshot {
                        success: entry.value().success,
                        failure: entry.value().failure,
                    },
                )
            })
            .collect();

        let fallbacks: BTreeMap<String, u64> = self
            .fallbacks
            .iter()
            .map(|entry| {
                let key = entry.key();
                (
                    format!(
                        "{}->{}:{}",
                        key.from_provider, key.to_provider, key.error_class
                    ),
                    *entry.value(),
                )
            })
            .collect();
        let total_fallbacks: u64 = fallbacks.values().sum();

        #[allow(clippy::cast_precision_loss)]
        let rate = |numerator: u64| {
            if total_queries == 0 {
                0.0
            } else {
                numerator as f64 / total_queries as f64
            }
        };

        MetricsSnapshot {
            queries_by_intent,
            denials_by_reason,
            denial_rate: rate(total_denials),
            fallback_rate: rate(total_fallbacks),
            providers,
            fallbacks,
            latency: self.latency.percentiles(),
        }
    }
}

/// Serializable view of one provider's counters
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ProviderSnapshot {
    pub success: u64,
    pub failure: u64,
}

/// Serializable point-in-time view of the registry
#[derive(Debug, serde::Serialize)]
pub struct MetricsSnapshot {
    pub queries_by_intent: BTreeMap<String, u64>,
    pub denials_by_reason: BTreeMap<String, u64>,
    pub denial_rate: f64,
    pub fallback_rate: f64,
    pub providers: BTreeMap<String, ProviderSnapshot>,
    pub fallbacks: BTreeMap<String, u64>,
    pub latency: LatencyPercentiles,
}
