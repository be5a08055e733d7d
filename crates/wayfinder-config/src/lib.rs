#![allow(clippy::must_use_candidate, clippy::missing_panics_doc)]

pub mod classifier;
pub mod data;
mod env;
pub mod llm;
mod loader;
pub mod logging;
pub mod observability;
pub mod rag;
pub mod router;
pub mod stores;

use serde::Deserialize;

pub use classifier::ClassifierConfig;
pub use data::DataConfig;
pub use llm::{LlmConfig, ProviderConfig};
pub use logging::LoggingConfig;
pub use observability::ObservabilityConfig;
pub use rag::RagConfig;
pub use router::RouterConfig;
pub use stores::StoresConfig;

/// Top-level Wayfinder configuration, read once at startup
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Ordered LLM provider list and retry tuning
    #[serde(default)]
    pub llm: LlmConfig,
    /// Intent classification thresholds and encoder endpoint
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Retrieval gate and synthesis bounds
    #[serde(default)]
    pub rag: RagConfig,
    /// Record-store read defaults
    #[serde(default)]
    pub data: DataConfig,
    /// Total budget and backpressure
    #[serde(default)]
    pub router: RouterConfig,
    /// Metrics window sizing
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Store adapter endpoints for the deployable
    #[serde(default)]
    pub stores: StoresConfig,
    /// Log filtering and format
    #[serde(default)]
    pub logging: LoggingConfig,
}
