use serde::Deserialize;

/// In-process metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Bounded window for the latency percentile ring
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

const fn default_window_size() -> usize {
    1024
}
