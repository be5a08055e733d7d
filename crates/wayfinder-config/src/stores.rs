use serde::Deserialize;
use url::Url;

/// External store endpoints for the deployable binary
///
/// The core depends only on the `RecordStore` and `VectorSearch` traits;
/// these URLs wire the JSON-over-HTTP adapters in `wayfinder`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoresConfig {
    /// Record store adapter base URL
    #[serde(default)]
    pub record_store_url: Option<Url>,
    /// Vector store adapter base URL
    #[serde(default)]
    pub vector_store_url: Option<Url>,
    /// Per-call store budget, bounded further by the query deadline
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_store_timeout_ms() -> u64 {
    1500
}
