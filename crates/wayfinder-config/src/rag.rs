use serde::Deserialize;

/// Retrieval-augmented engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RagConfig {
    /// Minimum best retrieval score; below it the engine refuses without
    /// calling a language model. Calibrated for cosine scores in [0, 1].
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Candidate chunks requested from the vector store
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Synthesis output bound
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            top_k: default_top_k(),
            max_tokens: default_max_tokens(),
        }
    }
}

const fn default_similarity_threshold() -> f64 {
    0.75
}

const fn default_top_k() -> usize {
    5
}

const fn default_max_tokens() -> u32 {
    512
}
