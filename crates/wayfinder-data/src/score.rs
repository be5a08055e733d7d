//! Recommendation scoring and the stable ordering contract

use wayfinder_core::Record;

use crate::extract::QueryTerms;

/// Weight for tag overlap between the query and a listing
const TAG_WEIGHT: i64 = 3;
/// Weight for a location match
const LOCATION_WEIGHT: i64 = 2;
/// Weight for a category the query implied
const CATEGORY_WEIGHT: i64 = 1;

/// Score one listing against the extracted terms
///
/// `score = 3 * tag_overlap + 2 * location_match + 1 * category_match`
pub fn score_listing(listing: &Record, terms: &QueryTerms) -> i64 {
    let tag_overlap = listing
        .get("tags")
        .and_then(serde_json::Value::as_array)
        .map_or(0, |tags| {
            tags.iter()
                .filter_map(serde_json::Value::as_str)
                .filter(|tag| terms.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
                .count()
        });

    let location_match = listing
        .get("location")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|location| {
            let lower = location.to_lowercase();
            terms.locations.iter().any(|l| lower.contains(l))
        });

    let category_match = listing
        .get("category")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|category| terms.categories.iter().any(|c| c == category));

    let tag_overlap = i64::try_from(tag_overlap).unwrap_or(i64::MAX / TAG_WEIGHT);

    TAG_WEIGHT * tag_overlap
        + LOCATION_WEIGHT * i64::from(location_match)
        + CATEGORY_WEIGHT * i64::from(category_match)
}

/// Order listings by `(score desc, created_at desc, listing_id asc)`
///
/// The tie-break is total, so identical inputs always produce identical
/// output order.
pub fn rank(mut listings: Vec<Record>, terms: &QueryTerms, limit: usize) -> Vec<Record> {
    let mut scored: Vec<(i64, Record)> = listings
        .drain(..)
        .map(|listing| (score_listing(&listing, terms), listing))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .cmp(score_a)
            .then_with(|| str_field(b, "created_at").cmp(str_field(a, "created_at")))
            .then_with(|| str_field(a, "listing_id").cmp(str_field(b, "listing_id")))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(_, listing)| listing)
        .collect()
}

fn str_field<'a>(record: &'a Record, field: &str) -> &'a str {
    record.get(field).and_then(serde_json::Value::as_str).unwrap_or("")
}
