use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// LLM provider pool configuration
///
/// Order matters: the first entry is the primary, and the gateway walks
/// the list in declaration order on failover.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// One LLM provider endpoint
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Stable identifier surfaced in envelopes and fallback counters
    pub id: String,
    /// Chat completions base URL
    pub base_url: Url,
    /// Bearer token for the provider
    pub api_key: SecretString,
    /// Model name sent on every request
    pub model: String,
    /// Total per-provider budget, covering all retries
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries on top of the first attempt, timeout/rate-limit only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay; doubles per retry, jittered
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    2500
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_backoff_initial_ms() -> u64 {
    250
}
