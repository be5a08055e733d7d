//! In-memory vector corpus with deterministic keyword-overlap scores

use std::time::Duration;

use async_trait::async_trait;
use wayfinder_rag::{ScoredChunk, VectorError, VectorSearch};

struct CorpusChunk {
    id: &'static str,
    text: &'static str,
    keywords: &'static [&'static str],
}

/// Scores peak below 1.0 so tests can distinguish "very good" from exact
const SCORE_CEILING: f64 = 0.97;

const CORPUS: &[CorpusChunk] = &[
    CorpusChunk {
        id: "policy-refunds",
        text: "Refunds for cancelled bookings are issued to the original payment method \
               within 14 days. Cancellations made at least 48 hours before check-in are free.",
        keywords: &["refund", "policy", "cancellation"],
    },
    CorpusChunk {
        id: "policy-privacy",
        text: "Personal data is processed under the PDPA. Travelers can request deletion \
               of their account data at any time.",
        keywords: &["privacy", "pdpa", "data", "personal"],
    },
    CorpusChunk {
        id: "nav-profile",
        text: "To change your profile photo, open Account Settings from the top-right menu \
               and choose Edit Profile.",
        keywords: &["profile", "settings", "photo", "account"],
    },
    CorpusChunk {
        id: "ts-payments",
        text: "If a payment fails with an error, check the card's international payments \
               setting, then retry. Contact support if the error persists.",
        keywords: &["payment", "error", "failed", "card"],
    },
];

pub struct InMemoryVectors;

impl InMemoryVectors {
    /// Fraction of chunk keywords present in the query, scaled under the
    /// ceiling; deterministic for identical queries
    fn score(query: &str, chunk: &CorpusChunk) -> f64 {
        let lower = query.to_lowercase();
        let matched = chunk
            .keywords
            .iter()
            .filter(|keyword| lower.contains(*keyword))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let fraction = matched as f64 / chunk.keywords.len() as f64;
        fraction * SCORE_CEILING
    }
}

#[async_trait]
impl VectorSearch for InMemoryVectors {
    async fn search(&self, text: &str, k: usize, _deadline: Duration) -> Result<Vec<ScoredChunk>, VectorError> {
        let mut chunks: Vec<ScoredChunk> = CORPUS
            .iter()
            .map(|chunk| ScoredChunk {
                source_id: chunk.id.to_owned(),
                text: chunk.text.to_owned(),
                score: Self::score(text, chunk),
                metadata: None,
            })
            .collect();
        chunks.sort_by(|a, b| b.score.total_cmp(&a.score));
        chunks.truncate(k);
        Ok(chunks)
    }
}
