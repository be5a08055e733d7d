#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Retrieval-augmented knowledge engine
//!
//! Retrieval gates synthesis twice: a similarity floor below which the
//! engine refuses without spending an LLM call, and a containment rule
//! that keeps live marketplace numbers out of the corpus path entirely.

pub mod prompt;
pub mod vector;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use wayfinder_config::RagConfig;
use wayfinder_core::{Citation, Intent, QueryContext};
use wayfinder_llm::{LlmGateway, LlmRequest};
use wayfinder_observability::events;

pub use vector::{HttpVectorStore, ScoredChunk, VectorError, VectorSearch};

/// Canned refusal when retrieval scores are below the gate
pub const INSUFFICIENT_CONTEXT_TEXT: &str = "I don't have enough information on that topic.";

/// Synthesis temperature; well under the global clamp
const RAG_TEMPERATURE: f64 = 0.3;

/// A retrieval request as dispatched by the router
#[derive(Debug, Clone)]
pub struct RagRequest {
    pub query: String,
    pub intent: Intent,
    pub k: usize,
}

/// A grounded answer with its citation trail
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub text: String,
    /// Ordered subset of retrieved chunks backing the answer
    pub citations: Vec<Citation>,
    pub best_score: f64,
    /// Provider that synthesized the text; `None` when degraded to the
    /// top chunk verbatim
    pub provider_id: Option<String>,
}

/// What the engine decided for this query
#[derive(Debug, Clone)]
pub enum RagOutcome {
    Answer(RagAnswer),
    /// Scores below the gate; served as a rag response with canned text
    InsufficientContext,
    /// Live-data intent reached the corpus path; served as a refusal
    CannotServeLiveData,
}

/// Engine failures, converted to envelopes only by the router
#[derive(Debug, Error)]
pub enum RagError {
    #[error("vector store unavailable")]
    StoreUnavailable,

    #[error("query deadline exceeded")]
    DeadlineExceeded,
}

impl From<VectorError> for RagError {
    fn from(error: VectorError) -> Self {
        tracing::error!(error = %error, "vector store call failed");
        Self::StoreUnavailable
    }
}

/// Retrieval-augmented engine
pub struct RagEngine {
    vector: Arc<dyn VectorSearch>,
    gateway: Arc<LlmGateway>,
    config: RagConfig,
    vector_timeout: Duration,
}

impl RagEngine {
    pub fn new(
        vector: Arc<dyn VectorSearch>,
        gateway: Arc<LlmGateway>,
        config: RagConfig,
        vector_timeout: Duration,
    ) -> Self {
        Self {
            vector,
            gateway,
            config,
            vector_timeout,
        }
    }

    /// Serve one knowledge intent
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when retrieval fails, `DeadlineExceeded` when
    /// the budget is gone before retrieval starts.
    pub async fn handle(&self, request: &RagRequest, ctx: &QueryContext) -> Result<RagOutcome, RagError> {
        // Containment: live marketplace numbers never come from the
        // corpus, whatever the scores would have been
        if matches!(
            request.intent,
            Intent::Analytics | Intent::Revenue | Intent::Moderation
        ) {
            tracing::warn!(
                correlation_id = %ctx.correlation_id(),
                intent = %request.intent,
                "live-data intent reached the rag engine, refusing"
            );
            return Ok(RagOutcome::CannotServeLiveData);
        }

        let deadline = ctx
            .remaining()
            .map(|remaining| remaining.min(self.vector_timeout))
            .ok_or(RagError::DeadlineExceeded)?;

        let mut chunks = self.vector.search(&request.query, request.k, deadline).await?;
        chunks.sort_by(|a, b| b.score.total_cmp(&a.score));

        let best_score = chunks.first().map_or(0.0, |chunk| chunk.score);

        tracing::info!(
            correlation_id = %ctx.correlation_id(),
            event = events::RAG_QUERY_COMPLETE,
            retrieved = chunks.len(),
            best_score,
            "retrieval complete"
        );

        // Similarity gate: below the floor, no LLM call happens
        if best_score < self.config.similarity_threshold {
            return Ok(RagOutcome::InsufficientContext);
        }

        // Only chunks clearing the gate reach the prompt and citations
        chunks.retain(|chunk| chunk.score >= self.config.similarity_threshold);

        let citations: Vec<Citation> = chunks
            .iter()
            .map(|chunk| Citation {
                source_id: chunk.source_id.clone(),
                score: chunk.score,
            })
            .collect();

        let llm_request = LlmRequest::new(
            prompt::SYSTEM_PROMPT,
            prompt::build_user_prompt(&request.query, &chunks),
            self.config.max_tokens,
            RAG_TEMPERATURE,
        );

        match self.gateway.complete(&llm_request, ctx).await {
            Ok(response) => Ok(RagOutcome::Answer(RagAnswer {
                text: response.text,
                citations,
                best_score,
                provider_id: Some(response.provider_id),
            })),
            Err(error) => {
                // Degrade to the top chunk verbatim; no fabricated prose
                tracing::warn!(
                    correlation_id = %ctx.correlation_id(),
                    error = %error,
                    "llm unavailable, degrading to extractive answer"
                );
                let top = &chunks[0];
                let text = format!("{} {}", top.text.trim(), prompt::citation_tag(0));
                Ok(RagOutcome::Answer(RagAnswer {
                    text,
                    citations: citations.into_iter().take(1).collect(),
                    best_score,
                    provider_id: None,
                }))
            }
        }
    }
}
