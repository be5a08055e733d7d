use serde::{Deserialize, Serialize};

/// The closed set of intents a query can resolve to
///
/// Adding a variant requires both a permission row in `wayfinder-access`
/// and a route decision in `wayfinder-router`; the compiler enforces
/// coverage through exhaustive matches in both places.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    /// Browse or discover listings
    Recommendation,
    /// A traveler's saved listings
    SavedItems,
    /// View/booking/rating counts for a partner or the whole system
    Analytics,
    /// Booking revenue sums per partner scope
    Revenue,
    /// Pending partner and listing approvals
    Moderation,
    /// Marketplace policies (refunds, cancellations, terms)
    Policy,
    /// How to find things in the product
    Navigation,
    /// Errors and things not working
    Troubleshooting,
}

impl Intent {
    /// Whether this intent reads data constrained to a single partner
    pub const fn is_partner_scoped(self) -> bool {
        matches!(self, Self::Analytics | Self::Revenue)
    }

    /// Tie-break precedence for keyword classification, higher wins
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Moderation => 8,
            Self::Revenue => 7,
            Self::Analytics => 6,
            Self::SavedItems => 5,
            Self::Troubleshooting => 4,
            Self::Navigation => 3,
            Self::Policy => 2,
            Self::Recommendation => 1,
        }
    }
}

/// Caller role, supplied pre-validated by the identity layer
///
/// The core never infers a role from the query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Traveler,
    Partner,
    Admin,
}

/// Which classifier stage produced the final intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClassificationMethod {
    /// Curated phrase tables matched at or above the keyword threshold
    Keyword,
    /// Cosine similarity against per-intent label centroids
    Embedding,
    /// Neither stage was confident; biased toward browsing
    Default,
}

/// Outcome of intent classification, one per query
///
/// Invariants: `method == Keyword` implies `confidence >= 0.8`;
/// `method == Default` implies `intent == Recommendation` with a
/// confidence below the configured threshold.
#[derive(Debug, Clone)]
pub struct IntentClassification {
    pub intent: Intent,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub method: ClassificationMethod,
    /// Phrases that matched during the keyword stage
    pub matched_terms: Vec<String>,
}
