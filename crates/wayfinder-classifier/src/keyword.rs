//! Keyword fast path
//!
//! Hand-curated phrase tables matched over a normalized query. A single
//! curated phrase is decisive; the 0.95 cap keeps keyword confidence
//! below certainty so downstream can still distinguish it from 1.0.

use wayfinder_core::Intent;

/// Minimum keyword score that short-circuits the embedding stage
pub const KEYWORD_THRESHOLD: f64 = 0.8;

/// Keyword confidence ceiling
pub const KEYWORD_CAP: f64 = 0.95;

/// Phrases expected for a fully on-intent query, per table
const MAX_EXPECTED_TERMS: f64 = 1.0;

/// Curated phrases per intent, pre-normalized
///
/// Phrases must survive [`normalize`] unchanged: lowercase, alphanumerics
/// and single spaces only.
const PHRASES: &[(Intent, &[&str])] = &[
    (
        Intent::Recommendation,
        &["show me", "find", "recommend", "suggest", "looking for", "places to stay"],
    ),
    (
        Intent::SavedItems,
        &["saved", "wishlist", "bookmarked", "my list", "favourites", "favorites"],
    ),
    (
        Intent::Analytics,
        &["how many", "views", "stats", "performance", "impressions", "conversion"],
    ),
    (
        Intent::Revenue,
        &["revenue", "earnings", "income", "payout", "how much did i earn"],
    ),
    (
        Intent::Moderation,
        &["pending", "approval", "approvals", "moderation", "applications", "review queue"],
    ),
    (
        Intent::Policy,
        &["policy", "refund", "cancellation", "terms", "pdpa", "privacy"],
    ),
    (
        Intent::Navigation,
        &["where do i", "where can i", "how do i get to", "navigate", "which page", "menu"],
    ),
    (
        Intent::Troubleshooting,
        &["error", "cant", "cannot", "why is", "not working", "failed", "broken"],
    ),
];

/// Lowercase, strip non-alphanumerics except spaces, collapse whitespace
pub fn normalize(query: &str) -> String {
    let stripped: String = query
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best keyword match over the normalized query
///
/// Score is `matched / max_expected` capped at [`KEYWORD_CAP`]; ties are
/// broken by intent precedence so sensitive intents win over browsing.
pub fn best_match(query: &str) -> Option<(Intent, f64, Vec<String>)> {
    let normalized = normalize(query);
    if normalized.is_empty() {
        return None;
    }

    let mut best: Option<(Intent, f64, Vec<String>)> = None;

    for (intent, phrases) in PHRASES {
        let matched: Vec<String> = phrases
            .iter()
            .filter(|phrase| normalized.contains(*phrase))
            .map(|phrase| (*phrase).to_owned())
            .collect();
        if matched.is_empty() {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let score = (matched.len() as f64 / MAX_EXPECTED_TERMS).min(KEYWORD_CAP);

        let better = match &best {
            None => true,
            Some((current, current_score, _)) => {
                score > *current_score
                    || ((score - current_score).abs() < f64::EPSILON
                        && intent.precedence() > current.precedence())
            }
        };
        if better {
            best = Some((*intent, score, matched));
        }
    }

    best
}
