//! Deterministic response text
//!
//! Used whenever the formatting model is unavailable, opted out of, or
//! disallowed. Analytics and revenue text is always produced here so the
//! numbers the user reads are the aggregates, verbatim.

use wayfinder_core::Record;
use wayfinder_data::{AggregateValue, Aggregates};

/// Fallback prose for recommendation results
pub fn recommendations(records: &[Record]) -> String {
    if records.is_empty() {
        return "No listings matched your query.".to_owned();
    }
    let titles: Vec<&str> = records
        .iter()
        .filter_map(|record| record.get("title").and_then(serde_json::Value::as_str))
        .collect();
    if titles.is_empty() {
        return format!("Found {} matching listings.", records.len());
    }
    format!(
        "Found {} matching listings: {}.",
        records.len(),
        titles.join(", ")
    )
}

/// Fallback prose for saved items
pub fn saved_items(records: &[Record]) -> String {
    if records.is_empty() {
        "You have no saved items yet.".to_owned()
    } else {
        format!("You have {} saved items.", records.len())
    }
}

/// Always-deterministic analytics text; values are the aggregates
pub fn analytics(aggregates: &Aggregates) -> String {
    let count = |name: &str| match aggregates.get(name) {
        Some(AggregateValue::Count(n)) => *n,
        _ => 0,
    };
    format!(
        "Counts for the selected window: {} views, {} bookings, {} ratings.",
        count("views"),
        count("bookings"),
        count("ratings")
    )
}

/// Always-deterministic revenue text; amounts keep their currency
pub fn revenue(aggregates: &Aggregates) -> String {
    match aggregates.get("revenue") {
        Some(AggregateValue::Sums(sums)) if !sums.is_empty() => {
            let parts: Vec<String> = sums
                .iter()
                .map(|sum| format!("{} {}", sum.amount, sum.currency))
                .collect();
            format!("Revenue for the selected window: {}.", parts.join(", "))
        }
        _ => "No revenue recorded in the selected window.".to_owned(),
    }
}

/// Moderation queue text
pub fn moderation(records: &[Record]) -> String {
    if records.is_empty() {
        "The moderation queue is empty.".to_owned()
    } else {
        format!("{} submissions are waiting for review.", records.len())
    }
}
