use serde::Deserialize;

/// Router budget and backpressure configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Total wall-clock budget per query; exceeded means a `timeout` refusal
    #[serde(default = "default_total_timeout_ms")]
    pub total_timeout_ms: u64,
    /// In-flight query cap; requests beyond it are refused fast, not queued
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            total_timeout_ms: default_total_timeout_ms(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

const fn default_total_timeout_ms() -> u64 {
    6000
}

const fn default_max_in_flight() -> usize {
    64
}
