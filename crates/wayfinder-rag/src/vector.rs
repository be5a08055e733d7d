//! Vector store contract and the HTTP adapter
//!
//! Scores are cosine similarities in [0, 1]; the engine's gate threshold
//! is calibrated for that metric. A dot-product store would need the
//! threshold recalibrated.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// One retrieved chunk with its similarity score
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredChunk {
    #[serde(rename = "id")]
    pub source_id: String,
    pub text: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Vector store failures
#[derive(Debug, Error)]
pub enum VectorError {
    #[error("vector store timed out")]
    Timeout,

    #[error("vector store error: {0}")]
    Other(String),
}

/// Semantic retrieval over the knowledge corpus
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Top-`k` chunks for the query text, any order
    async fn search(&self, text: &str, k: usize, deadline: Duration) -> Result<Vec<ScoredChunk>, VectorError>;
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    text: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchReply {
    chunks: Vec<ScoredChunk>,
}

/// Vector store reached over HTTP
pub struct HttpVectorStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpVectorStore {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl VectorSearch for HttpVectorStore {
    async fn search(&self, text: &str, k: usize, deadline: Duration) -> Result<Vec<ScoredChunk>, VectorError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let response = self
            .client
            .post(format!("{base}/search"))
            .timeout(deadline)
            .json(&SearchBody { text, k })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VectorError::Timeout
                } else {
                    VectorError::Other(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(VectorError::Other(format!(
                "vector store returned {}",
                response.status()
            )));
        }

        let reply: SearchReply = response
            .json()
            .await
            .map_err(|e| VectorError::Other(format!("unparseable search response: {e}")))?;
        Ok(reply.chunks)
    }
}
