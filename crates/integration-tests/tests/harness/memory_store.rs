//! In-memory record store seeded with marketplace fixtures

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use serde_json::json;
use wayfinder_core::Record;
use wayfinder_data::{
    AggregateOp, AggregateValue, Collection, CurrencyAmount, Filter, FilterOp, OrderBy,
    RecordStore, StoreError,
};

/// RFC 3339 timestamp `hours` in the past
pub fn hours_ago(hours: i64) -> String {
    (Timestamp::now() - SignedDuration::from_hours(hours)).to_string()
}

pub struct InMemoryStore {
    collections: HashMap<Collection, Vec<Record>>,
    calls: AtomicU32,
    failing: AtomicBool,
}

impl InMemoryStore {
    pub fn new(collections: HashMap<Collection, Vec<Record>>) -> Self {
        Self {
            collections,
            calls: AtomicU32::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Fixtures: Galle accommodations, saved items for `u1`, analytics
    /// events and bookings for partner `p42`, and a moderation queue
    pub fn seeded() -> Self {
        let mut collections = HashMap::new();

        collections.insert(
            Collection::Listings,
            records(vec![
                json!({
                    "listing_id": "lst-galle-reef",
                    "title": "Reef Villa",
                    "category": "accommodation",
                    "location": "Galle",
                    "price": 180,
                    "currency": "USD",
                    "tags": ["beach", "pool"],
                    "created_at": "2024-05-10T08:00:00Z",
                }),
                json!({
                    "listing_id": "lst-galle-fort",
                    "title": "Fort Guesthouse",
                    "category": "accommodation",
                    "location": "Galle",
                    "price": 95,
                    "currency": "USD",
                    "tags": ["historic", "beach"],
                    "created_at": "2024-04-02T08:00:00Z",
                }),
                json!({
                    "listing_id": "lst-galle-grand",
                    "title": "Grand Lighthouse Hotel",
                    "category": "accommodation",
                    "location": "Galle",
                    "price": 320,
                    "currency": "USD",
                    "tags": ["luxury"],
                    "created_at": "2024-06-01T08:00:00Z",
                }),
                json!({
                    "listing_id": "lst-ella-trek",
                    "title": "Ella Rock Trek",
                    "category": "tour",
                    "location": "Ella",
                    "price": 40,
                    "currency": "USD",
                    "tags": ["hike", "views"],
                    "created_at": "2024-03-15T08:00:00Z",
                }),
            ]),
        );

        collections.insert(
            Collection::SavedItems,
            records(vec![
                json!({
                    "saved_id": "sav-1",
                    "user_id": "u1",
                    "listing_id": "lst-galle-reef",
                    "title": "Reef Villa",
                    "saved_at": "2024-06-10T10:00:00Z",
                }),
                json!({
                    "saved_id": "sav-2",
                    "user_id": "u1",
                    "listing_id": "lst-ella-trek",
                    "title": "Ella Rock Trek",
                    "saved_at": "2024-06-20T10:00:00Z",
                }),
                json!({
                    "saved_id": "sav-3",
                    "user_id": "u9",
                    "listing_id": "lst-galle-fort",
                    "title": "Fort Guesthouse",
                    "saved_at": "2024-06-15T10:00:00Z",
                }),
            ]),
        );

        collections.insert(
            Collection::AnalyticsEvents,
            records(vec![
                // p42: three views inside the last week, one view outside it
                json!({"event_id": "ev-1", "event_type": "view", "partner_id": "p42", "occurred_at": hours_ago(5)}),
                json!({"event_id": "ev-2", "event_type": "view", "partner_id": "p42", "occurred_at": hours_ago(30)}),
                json!({"event_id": "ev-3", "event_type": "view", "partner_id": "p42", "occurred_at": hours_ago(100)}),
                json!({"event_id": "ev-4", "event_type": "view", "partner_id": "p42", "occurred_at": hours_ago(24 * 20)}),
                json!({"event_id": "ev-5", "event_type": "booking", "partner_id": "p42", "occurred_at": hours_ago(48)}),
                json!({"event_id": "ev-6", "event_type": "rating", "partner_id": "p42", "occurred_at": hours_ago(72)}),
                // Another partner's traffic must never leak into p42 scope
                json!({"event_id": "ev-7", "event_type": "view", "partner_id": "p99", "occurred_at": hours_ago(2)}),
                json!({"event_id": "ev-8", "event_type": "view", "partner_id": "p99", "occurred_at": hours_ago(3)}),
            ]),
        );

        collections.insert(
            Collection::Bookings,
            records(vec![
                json!({"booking_id": "bk-1", "partner_id": "p42", "total": "450.00", "currency": "USD", "booked_at": hours_ago(24)}),
                json!({"booking_id": "bk-2", "partner_id": "p42", "total": "300.50", "currency": "USD", "booked_at": hours_ago(72)}),
                // Outside the default 30-day window
                json!({"booking_id": "bk-3", "partner_id": "p42", "total": "120.00", "currency": "USD", "booked_at": hours_ago(24 * 40)}),
                json!({"booking_id": "bk-4", "partner_id": "p99", "total": "999.00", "currency": "USD", "booked_at": hours_ago(24)}),
            ]),
        );

        collections.insert(
            Collection::PendingApprovals,
            records(vec![
                json!({"approval_id": "apr-2", "kind": "listing", "name": "Lagoon Cabanas", "submitted_at": "2024-06-05T09:00:00Z"}),
                json!({"approval_id": "apr-1", "kind": "partner", "name": "Island Tours Ltd", "submitted_at": "2024-06-01T09:00:00Z"}),
                json!({"approval_id": "apr-3", "kind": "partner", "name": "Bay Divers", "submitted_at": "2024-06-09T09:00:00Z"}),
            ]),
        );

        Self::new(collections)
    }

    /// Flip the store into timeout mode
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Store calls observed (queries plus aggregates)
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn rows(&self, collection: Collection, filters: &[Filter]) -> Vec<Record> {
        self.collections
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|filter| matches(row, filter)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!("fixtures are objects"),
        })
        .collect()
}

fn matches(record: &Record, filter: &Filter) -> bool {
    let Some(value) = record.get(&filter.field) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => value == &filter.value,
        FilterOp::Lte => compare(value, &filter.value) != CmpOrdering::Greater,
        FilterOp::Gte => compare(value, &filter.value) != CmpOrdering::Less,
        FilterOp::Contains => match (value.as_str(), filter.value.as_str()) {
            (Some(haystack), Some(needle)) => {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => false,
        },
    }
}

fn compare(a: &serde_json::Value, b: &serde_json::Value) -> CmpOrdering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => CmpOrdering::Equal,
        },
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
        order_by: &[OrderBy],
        limit: usize,
        _deadline: Duration,
    ) -> Result<Vec<Record>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout);
        }

        let mut rows = self.rows(collection, filters);
        for order in order_by.iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = compare(
                    a.get(&order.field).unwrap_or(&serde_json::Value::Null),
                    b.get(&order.field).unwrap_or(&serde_json::Value::Null),
                );
                if order.descending { ordering.reverse() } else { ordering }
            });
        }
        rows.truncate(limit);
        Ok(rows)
    }

    async fn aggregate(
        &self,
        collection: Collection,
        filters: &[Filter],
        op: &AggregateOp,
        _deadline: Duration,
    ) -> Result<AggregateValue, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout);
        }

        let rows = self.rows(collection, filters);
        match op {
            AggregateOp::Count => Ok(AggregateValue::Count(rows.len() as u64)),
            AggregateOp::SumByCurrency { field } => {
                let mut sums: Vec<CurrencyAmount> = Vec::new();
                for row in rows {
                    let amount = row
                        .get(field)
                        .and_then(|value| match value {
                            serde_json::Value::String(s) => Decimal::from_str(s).ok(),
                            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
                            _ => None,
                        })
                        .unwrap_or_default();
                    let currency = row
                        .get("currency")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("USD")
                        .to_owned();

                    match sums.iter_mut().find(|sum| sum.currency == currency) {
                        Some(sum) => sum.amount += amount,
                        None => sums.push(CurrencyAmount { amount, currency }),
                    }
                }
                Ok(AggregateValue::Sums(sums))
            }
        }
    }
}
