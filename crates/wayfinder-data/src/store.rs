//! Record store contract
//!
//! The store is an external collaborator; the engine only depends on this
//! trait. Every call carries an explicit deadline derived from the
//! query's remaining budget.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wayfinder_core::Record;

/// Collections the marketplace store exposes for filtered reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Listings,
    Bookings,
    AnalyticsEvents,
    SavedItems,
    PendingApprovals,
}

/// Comparison applied by a [`Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Lte,
    Gte,
    /// Case-insensitive substring match on string fields
    Contains,
}

/// One predicate over a record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: serde_json::Value,
}

impl Filter {
    pub fn new(field: &str, op: FilterOp, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.to_owned(),
            op,
            value: value.into(),
        }
    }
}

/// Sort key for a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            descending: true,
        }
    }
}

/// Aggregation requested from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOp {
    /// Number of records matching the filters
    Count,
    /// Per-currency decimal sum of a field
    SumByCurrency { field: String },
}

/// A money amount in one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub amount: Decimal,
    pub currency: String,
}

/// A computed aggregate, always typed, never a formatted string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateValue {
    Count(u64),
    Sums(Vec<CurrencyAmount>),
}

/// Aggregates keyed by a caller-chosen name
pub type Aggregates = BTreeMap<String, AggregateValue>;

/// Store failures; both classes surface to callers as unavailability
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store timed out")]
    Timeout,

    #[error("store error: {0}")]
    Other(String),
}

/// Filtered reads over the marketplace record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Filtered, ordered, limited read
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
        order_by: &[OrderBy],
        limit: usize,
        deadline: Duration,
    ) -> Result<Vec<Record>, StoreError>;

    /// Compute one aggregate over the matching records
    async fn aggregate(
        &self,
        collection: Collection,
        filters: &[Filter],
        op: &AggregateOp,
        deadline: Duration,
    ) -> Result<AggregateValue, StoreError>;
}
