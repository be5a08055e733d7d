use serde::Deserialize;

/// Data engine read defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Default record cap when the caller does not specify one
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Fixed cap on the moderation queue read
    #[serde(default = "default_moderation_limit")]
    pub moderation_limit: usize,
    /// Default analytics/revenue window when no time range is given
    #[serde(default = "default_analytics_window_days")]
    pub analytics_window_days: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            moderation_limit: default_moderation_limit(),
            analytics_window_days: default_analytics_window_days(),
        }
    }
}

const fn default_limit() -> usize {
    5
}

const fn default_moderation_limit() -> usize {
    50
}

const fn default_analytics_window_days() -> u32 {
    30
}
