//! Embedding fallback stage
//!
//! Queries the external sentence encoder and compares against per-intent
//! centroids built once at startup from short canonical examples.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use wayfinder_core::Intent;

/// Encoder failures; always recoverable by falling back to keywords
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("encoder unreachable: {0}")]
    Unreachable(String),

    #[error("encoder returned an invalid vector")]
    InvalidVector,
}

/// External sentence encoder contract
///
/// `encode` must be deterministic and stable across calls so that cached
/// centroids stay comparable with per-query vectors.
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(&self, text: &str) -> Result<Vec<f32>, EncoderError>;
}

#[derive(Debug, Serialize)]
struct EncodeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EncodeResponse {
    embedding: Vec<f32>,
}

/// JSON-over-HTTP encoder client
pub struct HttpEncoder {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpEncoder {
    pub fn new(url: Url, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            timeout,
        }
    }
}

#[async_trait]
impl Encoder for HttpEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>, EncoderError> {
        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(&EncodeRequest { text })
            .send()
            .await
            .map_err(|e| EncoderError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EncoderError::Unreachable(format!(
                "encoder returned {}",
                response.status()
            )));
        }

        let body: EncodeResponse = response
            .json()
            .await
            .map_err(|_| EncoderError::InvalidVector)?;

        if body.embedding.is_empty() {
            return Err(EncoderError::InvalidVector);
        }
        Ok(body.embedding)
    }
}

/// Short canonical examples per intent used to seed centroids
pub const CANONICAL_EXAMPLES: &[(Intent, &[&str])] = &[
    (
        Intent::Recommendation,
        &[
            "show me beach resorts near the coast",
            "find a tour for next weekend",
            "recommend somewhere to stay in the hills",
        ],
    ),
    (
        Intent::SavedItems,
        &[
            "what did i save earlier",
            "open my wishlist",
            "the listings i bookmarked",
        ],
    ),
    (
        Intent::Analytics,
        &[
            "how many people viewed my listing",
            "booking stats for this month",
            "how is my tour performing",
        ],
    ),
    (
        Intent::Revenue,
        &[
            "how much did i earn this month",
            "total payout for my bookings",
            "income from my listings",
        ],
    ),
    (
        Intent::Moderation,
        &[
            "pending partner applications",
            "listings waiting for approval",
            "what is in the moderation queue",
        ],
    ),
    (
        Intent::Policy,
        &[
            "what is the refund policy",
            "cancellation terms for bookings",
            "how is my personal data handled",
        ],
    ),
    (
        Intent::Navigation,
        &[
            "where do i change my profile photo",
            "which page lists my bookings",
            "how do i get to account settings",
        ],
    ),
    (
        Intent::Troubleshooting,
        &[
            "my payment failed with an error",
            "the booking page is not working",
            "i cannot upload photos",
        ],
    ),
];

/// Mean-of-examples vector for one intent
#[derive(Debug, Clone)]
pub struct Centroid {
    pub intent: Intent,
    pub vector: Vec<f32>,
}

/// Encode every canonical example and average per intent
///
/// # Errors
///
/// Propagates the first encoder failure; the caller degrades to
/// keyword-only classification.
pub async fn build_centroids(encoder: &dyn Encoder) -> Result<Vec<Centroid>, EncoderError> {
    let mut centroids = Vec::with_capacity(CANONICAL_EXAMPLES.len());

    for (intent, examples) in CANONICAL_EXAMPLES {
        let mut sum: Vec<f32> = Vec::new();
        for example in *examples {
            let vector = encoder.encode(example).await?;
            if sum.is_empty() {
                sum = vector;
            } else {
                if sum.len() != vector.len() {
                    return Err(EncoderError::InvalidVector);
                }
                for (acc, component) in sum.iter_mut().zip(vector) {
                    *acc += component;
                }
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let count = examples.len() as f32;
        for component in &mut sum {
            *component /= count;
        }
        centroids.push(Centroid {
            intent: *intent,
            vector: sum,
        });
    }

    Ok(centroids)
}

/// Cosine similarity, zero when either vector has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Argmax of cosine similarity across centroids
pub fn nearest_intent(query_vector: &[f32], centroids: &[Centroid]) -> Option<(Intent, f64)> {
    centroids
        .iter()
        .map(|centroid| (centroid.intent, cosine_similarity(query_vector, &centroid.vector)))
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
}
