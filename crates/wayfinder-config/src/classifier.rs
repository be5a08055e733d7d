use serde::Deserialize;
use url::Url;

/// Intent classifier configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Acceptance cutoff for the embedding stage; a classification at or
    /// below this value falls through to the default branch
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// External sentence encoder endpoint; absent means keyword-only
    #[serde(default)]
    pub encoder_url: Option<Url>,
    /// Per-call encoder budget
    #[serde(default = "default_encoder_timeout_ms")]
    pub encoder_timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            encoder_url: None,
            encoder_timeout_ms: default_encoder_timeout_ms(),
        }
    }
}

const fn default_confidence_threshold() -> f64 {
    0.6
}

const fn default_encoder_timeout_ms() -> u64 {
    500
}
