//! Deterministic query-term extraction for recommendations
//!
//! Regex plus token-list matching against known locations and category
//! synonyms. No model is involved, so the same query always yields the
//! same terms.

use std::sync::OnceLock;

use regex::Regex;

/// Destinations the marketplace serves, matched case-insensitively
const KNOWN_LOCATIONS: &[&str] = &[
    "galle",
    "colombo",
    "kandy",
    "ella",
    "mirissa",
    "sigiriya",
    "unawatuna",
    "trincomalee",
    "nuwara eliya",
    "arugam bay",
];

/// Synonym tokens mapped to a canonical listing category
const CATEGORY_SYNONYMS: &[(&str, &[&str])] = &[
    ("accommodation", &["resort", "resorts", "hotel", "hotels", "villa", "villas", "guesthouse", "stay", "room", "rooms"]),
    ("tour", &["tour", "tours", "safari", "trek", "hike", "excursion", "sightseeing"]),
    ("transport", &["taxi", "transfer", "driver", "tuktuk", "shuttle"]),
    ("dining", &["restaurant", "restaurants", "cafe", "dining", "food"]),
    ("activity", &["surf", "surfing", "diving", "snorkeling", "yoga", "whale", "kayaking"]),
];

/// Tokens too generic to contribute to tag overlap
const STOPWORDS: &[&str] = &[
    "show", "me", "a", "an", "the", "in", "at", "on", "for", "to", "of", "with", "under", "below",
    "near", "find", "recommend", "suggest", "some", "any", "and", "or", "my", "i", "please",
];

/// Terms detected in a recommendation query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms {
    /// Canonical categories implied by the query
    pub categories: Vec<String>,
    /// Known locations mentioned
    pub locations: Vec<String>,
    /// Upper price bound, e.g. from "under $200"
    pub price_cap: Option<u64>,
    /// Remaining meaningful tokens for tag overlap
    pub tags: Vec<String>,
}

fn price_cap_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:under|below|less than|up to|max(?:imum)?)\s*\$?\s*(\d+)")
            .expect("must be valid regex")
    })
}

/// Detect an analytics window implied by the query phrasing
///
/// Returns the trailing window in days, or `None` when the query names no
/// period and the configured default applies.
pub fn window_days(query: &str) -> Option<u32> {
    let lower = query.to_lowercase();
    if lower.contains("today") {
        Some(1)
    } else if lower.contains("this week") || lower.contains("last week") || lower.contains("past week") {
        Some(7)
    } else if lower.contains("this month") || lower.contains("last month") || lower.contains("past month")
        || lower.contains("last 30 days")
    {
        Some(30)
    } else if lower.contains("this year") || lower.contains("last year") {
        Some(365)
    } else {
        None
    }
}

/// Extract categories, locations, a price cap, and tag tokens
pub fn extract_terms(query: &str) -> QueryTerms {
    let lower = query.to_lowercase();

    let locations: Vec<String> = KNOWN_LOCATIONS
        .iter()
        .filter(|location| lower.contains(*location))
        .map(|location| (*location).to_owned())
        .collect();

    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let mut categories = Vec::new();
    for (canonical, synonyms) in CATEGORY_SYNONYMS {
        if tokens.iter().any(|token| synonyms.contains(token)) {
            categories.push((*canonical).to_owned());
        }
    }

    let price_cap = price_cap_pattern()
        .captures(&lower)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok());

    let tags: Vec<String> = tokens
        .iter()
        .filter(|token| {
            !STOPWORDS.contains(*token)
                && !token.chars().all(char::is_numeric)
                && !locations.iter().any(|l| l.split_whitespace().any(|part| part == **token))
        })
        .map(|token| (*token).to_owned())
        .collect();

    QueryTerms {
        categories,
        locations,
        price_cap,
        tags,
    }
}
