#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Two-stage intent classification
//!
//! Keyword fast path first, embedding similarity as fallback, and a
//! default branch that biases ambiguous queries toward browsing, never
//! toward a sensitive intent. Classification always produces a value.

pub mod embedding;
pub mod keyword;

use std::sync::Arc;
use std::time::Duration;

use wayfinder_config::ClassifierConfig;
use wayfinder_core::{ClassificationMethod, Intent, IntentClassification};

pub use embedding::{Encoder, EncoderError, HttpEncoder};
pub use keyword::KEYWORD_THRESHOLD;

use embedding::Centroid;

/// Two-stage classifier with startup-cached centroids
pub struct Classifier {
    /// Embedding acceptance cutoff; strict-greater, so a similarity equal
    /// to the threshold falls through to the default branch
    confidence_threshold: f64,
    encoder: Option<Arc<dyn Encoder>>,
    centroids: Vec<Centroid>,
}

impl Classifier {
    /// Build the classifier, encoding label centroids once
    ///
    /// When the encoder is absent or unreachable at startup the embedding
    /// stage is disabled and classification degrades to keyword + default.
    pub async fn build(config: &ClassifierConfig, encoder: Option<Arc<dyn Encoder>>) -> Self {
        let mut centroids = Vec::new();
        let mut active_encoder = None;

        if let Some(encoder) = encoder {
            match embedding::build_centroids(encoder.as_ref()).await {
                Ok(built) => {
                    centroids = built;
                    active_encoder = Some(encoder);
                }
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        "encoder unavailable at startup, embedding stage disabled"
                    );
                }
            }
        }

        Self {
            confidence_threshold: config.confidence_threshold,
            encoder: active_encoder,
            centroids,
        }
    }

    /// Build the HTTP encoder from configuration when a URL is present
    pub fn encoder_from_config(config: &ClassifierConfig) -> Option<Arc<dyn Encoder>> {
        config.encoder_url.clone().map(|url| {
            Arc::new(HttpEncoder::new(url, Duration::from_millis(config.encoder_timeout_ms)))
                as Arc<dyn Encoder>
        })
    }

    /// Classify one query; never fails
    pub async fn classify(&self, query: &str) -> IntentClassification {
        // Stage 1: keyword fast path
        let keyword_match = keyword::best_match(query);
        if let Some((intent, confidence, matched_terms)) = &keyword_match
            && *confidence >= KEYWORD_THRESHOLD
        {
            return IntentClassification {
                intent: *intent,
                confidence: *confidence,
                method: ClassificationMethod::Keyword,
                matched_terms: matched_terms.clone(),
            };
        }

        let keyword_score = keyword_match.as_ref().map_or(0.0, |(_, score, _)| *score);

        // Stage 2: embedding similarity, skipped when degraded
        let embedding_result = match &self.encoder {
            Some(encoder) if !self.centroids.is_empty() => match encoder.encode(query).await {
                Ok(vector) => embedding::nearest_intent(&vector, &self.centroids),
                Err(error) => {
                    tracing::warn!(error = %error, "encoder unreachable, skipping embedding stage");
                    None
                }
            },
            _ => None,
        };

        if let Some((intent, similarity)) = embedding_result
            && similarity > self.confidence_threshold
        {
            return IntentClassification {
                intent,
                confidence: similarity,
                method: ClassificationMethod::Embedding,
                matched_terms: Vec::new(),
            };
        }

        // Default: bias ambiguity toward browsing, never toward
        // sensitive intents
        let best_observed = embedding_result
            .map_or(keyword_score, |(_, similarity)| keyword_score.max(similarity));

        IntentClassification {
            intent: Intent::Recommendation,
            confidence: best_observed,
            method: ClassificationMethod::Default,
            matched_terms: Vec::new(),
        }
    }
}
