//! Deterministic reads against the record store, one operation per intent

use std::sync::Arc;
use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use thiserror::Error;
use wayfinder_config::DataConfig;
use wayfinder_core::{AccessScope, Intent, QueryContext, Record};
use wayfinder_observability::events;

use crate::extract::extract_terms;
use crate::score::rank;
use crate::store::{
    AggregateOp, Aggregates, Collection, Filter, FilterOp, OrderBy, RecordStore, StoreError,
};

/// Extra headroom requested from the store so the ranker has candidates
/// beyond the caller's limit
const FETCH_MULTIPLIER: usize = 10;

/// Closed time window for analytics and revenue reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    /// The trailing window ending now
    pub fn trailing_days(days: u32) -> Self {
        let end = Timestamp::now();
        let start = end - SignedDuration::from_hours(24 * i64::from(days));
        Self { start, end }
    }
}

/// A data read as dispatched by the router
#[derive(Debug, Clone)]
pub struct DataRequest {
    pub intent: Intent,
    /// Raw query text, used only by the recommendation extractor
    pub query: String,
    /// Scope the validator granted; reads must constrain by it
    pub scope: AccessScope,
    pub time_range: Option<TimeRange>,
    pub limit: usize,
}

/// Records and typed aggregates drawn entirely from the store
#[derive(Debug, Clone, Default)]
pub struct DataResult {
    pub records: Vec<Record>,
    pub aggregates: Option<Aggregates>,
    pub total_count: Option<usize>,
}

/// Engine failures, converted to envelopes only by the router
#[derive(Debug, Error)]
pub enum DataError {
    /// The store timed out or errored; the router refuses with
    /// `store_unavailable`
    #[error("record store unavailable")]
    StoreUnavailable,

    /// The query budget ran out before the read started
    #[error("query deadline exceeded")]
    DeadlineExceeded,

    /// The router dispatched an intent this engine does not serve
    #[error("intent {0} is not a data intent")]
    UnsupportedIntent(Intent),

    /// The granted scope does not fit the operation
    #[error("scope does not fit intent {0}")]
    InvalidScope(Intent),
}

impl From<StoreError> for DataError {
    fn from(error: StoreError) -> Self {
        tracing::error!(error = %error, "record store call failed");
        Self::StoreUnavailable
    }
}

/// Deterministic structured-data engine
pub struct DataEngine {
    store: Arc<dyn RecordStore>,
    config: DataConfig,
    store_timeout: Duration,
}

impl DataEngine {
    pub fn new(store: Arc<dyn RecordStore>, config: DataConfig, store_timeout: Duration) -> Self {
        Self {
            store,
            config,
            store_timeout,
        }
    }

    /// Serve one data intent
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` on any store failure, `DeadlineExceeded` when
    /// the budget is gone, and `UnsupportedIntent`/`InvalidScope` on
    /// dispatch bugs.
    pub async fn handle(&self, request: &DataRequest, ctx: &QueryContext) -> Result<DataResult, DataError> {
        let result = match request.intent {
            Intent::Recommendation => self.recommendations(request, ctx).await?,
            Intent::SavedItems => self.saved_items(request, ctx).await?,
            Intent::Analytics => self.analytics(request, ctx).await?,
            Intent::Revenue => self.revenue(request, ctx).await?,
            Intent::Moderation => self.moderation(ctx).await?,
            other => return Err(DataError::UnsupportedIntent(other)),
        };

        tracing::info!(
            correlation_id = %ctx.correlation_id(),
            event = events::STORE_QUERY_COMPLETE,
            intent = %request.intent,
            records = result.records.len(),
            has_aggregates = result.aggregates.is_some(),
            "store query complete"
        );

        Ok(result)
    }

    /// Budget for the next store call: the query's remaining time, capped
    /// by the per-call store timeout
    fn deadline(&self, ctx: &QueryContext) -> Result<Duration, DataError> {
        ctx.remaining()
            .map(|remaining| remaining.min(self.store_timeout))
            .ok_or(DataError::DeadlineExceeded)
    }

    async fn recommendations(
        &self,
        request: &DataRequest,
        ctx: &QueryContext,
    ) -> Result<DataResult, DataError> {
        let terms = extract_terms(&request.query);

        let mut filters = Vec::new();
        if let Some(cap) = terms.price_cap {
            filters.push(Filter::new("price", FilterOp::Lte, cap));
        }
        if let [category] = terms.categories.as_slice() {
            filters.push(Filter::new("category", FilterOp::Eq, category.as_str()));
        }
        if let Some(location) = terms.locations.first() {
            filters.push(Filter::new("location", FilterOp::Contains, location.as_str()));
        }

        let fetch_limit = request.limit.saturating_mul(FETCH_MULTIPLIER);
        let candidates = self
            .store
            .query(
                Collection::Listings,
                &filters,
                &[OrderBy::desc("created_at")],
                fetch_limit,
                self.deadline(ctx)?,
            )
            .await?;

        let records = rank(candidates, &terms, request.limit);
        let total = records.len();

        Ok(DataResult {
            records,
            aggregates: None,
            total_count: Some(total),
        })
    }

    async fn saved_items(&self, request: &DataRequest, ctx: &QueryContext) -> Result<DataResult, DataError> {
        let AccessScope::User(user_id) = &request.scope else {
            return Err(DataError::InvalidScope(request.intent));
        };

        let records = self
            .store
            .query(
                Collection::SavedItems,
                &[Filter::new("user_id", FilterOp::Eq, user_id.as_str())],
                &[OrderBy::desc("saved_at")],
                request.limit,
                self.deadline(ctx)?,
            )
            .await?;

        let total = records.len();
        Ok(DataResult {
            records,
            aggregates: None,
            total_count: Some(total),
        })
    }

    async fn analytics(&self, request: &DataRequest, ctx: &QueryContext) -> Result<DataResult, DataError> {
        let filters = self.scoped_window_filters(request, "occurred_at")?;

        let mut aggregates = Aggregates::new();
        for (name, event_type) in [("views", "view"), ("bookings", "booking"), ("ratings", "rating")] {
            let mut event_filters = filters.clone();
            event_filters.push(Filter::new("event_type", FilterOp::Eq, event_type));

            let value = self
                .store
                .aggregate(
                    Collection::AnalyticsEvents,
                    &event_filters,
                    &AggregateOp::Count,
                    self.deadline(ctx)?,
                )
                .await?;
            aggregates.insert(name.to_owned(), value);
        }

        Ok(DataResult {
            records: Vec::new(),
            aggregates: Some(aggregates),
            total_count: None,
        })
    }

    async fn revenue(&self, request: &DataRequest, ctx: &QueryContext) -> Result<DataResult, DataError> {
        let filters = self.scoped_window_filters(request, "booked_at")?;

        let value = self
            .store
            .aggregate(
                Collection::Bookings,
                &filters,
                &AggregateOp::SumByCurrency {
                    field: "total".to_owned(),
                },
                self.deadline(ctx)?,
            )
            .await?;

        let mut aggregates = Aggregates::new();
        aggregates.insert("revenue".to_owned(), value);

        Ok(DataResult {
            records: Vec::new(),
            aggregates: Some(aggregates),
            total_count: None,
        })
    }

    async fn moderation(&self, ctx: &QueryContext) -> Result<DataResult, DataError> {
        let records = self
            .store
            .query(
                Collection::PendingApprovals,
                &[],
                &[OrderBy::asc("submitted_at")],
                self.config.moderation_limit,
                self.deadline(ctx)?,
            )
            .await?;

        let total = records.len();
        Ok(DataResult {
            records,
            aggregates: None,
            total_count: Some(total),
        })
    }

    /// Partner scope plus the time window, shared by analytics and revenue
    fn scoped_window_filters(
        &self,
        request: &DataRequest,
        time_field: &str,
    ) -> Result<Vec<Filter>, DataError> {
        let mut filters = Vec::new();
        match &request.scope {
            AccessScope::Partner(partner_id) => {
                filters.push(Filter::new("partner_id", FilterOp::Eq, partner_id.as_str()));
            }
            AccessScope::Unrestricted => {}
            AccessScope::User(_) => return Err(DataError::InvalidScope(request.intent)),
        }

        let range = request.time_range.clone().unwrap_or_else(|| {
            let days = crate::extract::window_days(&request.query)
                .unwrap_or(self.config.analytics_window_days);
            TimeRange::trailing_days(days)
        });
        filters.push(Filter::new(time_field, FilterOp::Gte, range.start.to_string()));
        filters.push(Filter::new(time_field, FilterOp::Lte, range.end.to_string()));

        Ok(filters)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::store::{AggregateValue, CurrencyAmount};

    /// Store double that records calls and replays canned results
    #[derive(Default)]
    struct RecordingStore {
        queries: Mutex<Vec<(Collection, Vec<Filter>, Vec<OrderBy>, usize)>>,
        aggregates: Mutex<Vec<(Collection, Vec<Filter>, AggregateOp)>>,
        records: Vec<Record>,
        fail: bool,
    }

    impl RecordingStore {
        fn with_records(records: Vec<serde_json::Value>) -> Self {
            Self {
                records: records
                    .into_iter()
                    .map(|value| match value {
                        serde_json::Value::Object(map) => map,
                        _ => unreachable!(),
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl RecordStore for RecordingStore {
        async fn query(
            &self,
            collection: Collection,
            filters: &[Filter],
            order_by: &[OrderBy],
            limit: usize,
            _deadline: Duration,
        ) -> Result<Vec<Record>, StoreError> {
            if self.fail {
                return Err(StoreError::Timeout);
            }
            self.queries
                .lock()
                .unwrap()
                .push((collection, filters.to_vec(), order_by.to_vec(), limit));
            Ok(self.records.clone())
        }

        async fn aggregate(
            &self,
            collection: Collection,
            filters: &[Filter],
            op: &AggregateOp,
            _deadline: Duration,
        ) -> Result<AggregateValue, StoreError> {
            if self.fail {
                return Err(StoreError::Timeout);
            }
            self.aggregates
                .lock()
                .unwrap()
                .push((collection, filters.to_vec(), op.clone()));
            match op {
                AggregateOp::Count => Ok(AggregateValue::Count(7)),
                AggregateOp::SumByCurrency { .. } => Ok(AggregateValue::Sums(vec![CurrencyAmount {
                    amount: Decimal::new(125_050, 2),
                    currency: "USD".to_owned(),
                }])),
            }
        }
    }

    fn engine(store: RecordingStore) -> (DataEngine, Arc<RecordingStore>) {
        let store = Arc::new(store);
        (
            DataEngine::new(
                Arc::clone(&store) as Arc<dyn RecordStore>,
                DataConfig::default(),
                Duration::from_millis(1500),
            ),
            store,
        )
    }

    fn ctx() -> QueryContext {
        QueryContext::new(Duration::from_secs(6))
    }

    fn request(intent: Intent, scope: AccessScope) -> DataRequest {
        DataRequest {
            intent,
            query: String::new(),
            scope,
            time_range: None,
            limit: 5,
        }
    }

    #[tokio::test]
    async fn recommendation_builds_filters_from_extracted_terms() {
        let (engine, store) = engine(RecordingStore::with_records(vec![json!({
            "listing_id": "l1",
            "category": "accommodation",
            "location": "Galle",
            "price": 180,
            "tags": ["beach"],
            "created_at": "2024-01-01T00:00:00Z",
        })]));

        let mut req = request(Intent::Recommendation, AccessScope::Unrestricted);
        req.query = "Show me beach resorts in Galle under $200".to_owned();

        let result = engine.handle(&req, &ctx()).await.unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.total_count, Some(1));

        let queries = store.queries.lock().unwrap();
        let (collection, filters, order_by, limit) = &queries[0];
        assert_eq!(*collection, Collection::Listings);
        assert_eq!(*limit, 50);
        assert_eq!(order_by, &vec![OrderBy::desc("created_at")]);
        assert!(filters.contains(&Filter::new("price", FilterOp::Lte, 200)));
        assert!(filters.contains(&Filter::new("category", FilterOp::Eq, "accommodation")));
        assert!(filters.contains(&Filter::new("location", FilterOp::Contains, "galle")));
    }

    #[tokio::test]
    async fn saved_items_requires_user_scope() {
        let (engine, store) = engine(RecordingStore::default());

        let req = request(Intent::SavedItems, AccessScope::User("u1".to_owned()));
        engine.handle(&req, &ctx()).await.unwrap();

        let queries = store.queries.lock().unwrap();
        let (collection, filters, order_by, _) = &queries[0];
        assert_eq!(*collection, Collection::SavedItems);
        assert_eq!(filters, &vec![Filter::new("user_id", FilterOp::Eq, "u1")]);
        assert_eq!(order_by, &vec![OrderBy::desc("saved_at")]);

        let bad = request(Intent::SavedItems, AccessScope::Unrestricted);
        assert!(matches!(
            engine.handle(&bad, &ctx()).await.unwrap_err(),
            DataError::InvalidScope(Intent::SavedItems)
        ));
    }

    #[tokio::test]
    async fn analytics_counts_three_event_types_in_partner_scope() {
        let (engine, store) = engine(RecordingStore::default());

        let req = request(Intent::Analytics, AccessScope::Partner("p42".to_owned()));
        let result = engine.handle(&req, &ctx()).await.unwrap();

        let aggregates = result.aggregates.unwrap();
        assert_eq!(aggregates["views"], AggregateValue::Count(7));
        assert_eq!(aggregates["bookings"], AggregateValue::Count(7));
        assert_eq!(aggregates["ratings"], AggregateValue::Count(7));
        assert!(result.records.is_empty());

        let calls = store.aggregates.lock().unwrap();
        assert_eq!(calls.len(), 3);
        for (collection, filters, op) in calls.iter() {
            assert_eq!(*collection, Collection::AnalyticsEvents);
            assert_eq!(*op, AggregateOp::Count);
            assert!(filters.contains(&Filter::new("partner_id", FilterOp::Eq, "p42")));
            assert!(filters.iter().any(|f| f.field == "occurred_at" && f.op == FilterOp::Gte));
            assert!(filters.iter().any(|f| f.field == "occurred_at" && f.op == FilterOp::Lte));
        }
    }

    #[tokio::test]
    async fn this_week_narrows_the_analytics_window() {
        let (engine, store) = engine(RecordingStore::default());

        let mut req = request(Intent::Analytics, AccessScope::Partner("p42".to_owned()));
        req.query = "How many views did I get this week?".to_owned();
        engine.handle(&req, &ctx()).await.unwrap();

        let calls = store.aggregates.lock().unwrap();
        let (_, filters, _) = &calls[0];
        let start: Timestamp = filters
            .iter()
            .find(|f| f.field == "occurred_at" && f.op == FilterOp::Gte)
            .and_then(|f| f.value.as_str())
            .unwrap()
            .parse()
            .unwrap();

        let hours = (Timestamp::now().as_second() - start.as_second()) / 3600;
        assert!((167..=168).contains(&hours), "window was {hours}h, expected ~168h");
    }

    #[tokio::test]
    async fn revenue_sums_decimals_by_currency() {
        let (engine, store) = engine(RecordingStore::default());

        let req = request(Intent::Revenue, AccessScope::Partner("p42".to_owned()));
        let result = engine.handle(&req, &ctx()).await.unwrap();

        let aggregates = result.aggregates.unwrap();
        let AggregateValue::Sums(sums) = &aggregates["revenue"] else {
            panic!("expected sums");
        };
        assert_eq!(sums[0].amount, Decimal::new(125_050, 2));
        assert_eq!(sums[0].currency, "USD");

        let calls = store.aggregates.lock().unwrap();
        let (collection, _, op) = &calls[0];
        assert_eq!(*collection, Collection::Bookings);
        assert_eq!(
            *op,
            AggregateOp::SumByCurrency {
                field: "total".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn admin_analytics_has_no_partner_filter() {
        let (engine, store) = engine(RecordingStore::default());

        let req = request(Intent::Analytics, AccessScope::Unrestricted);
        engine.handle(&req, &ctx()).await.unwrap();

        let calls = store.aggregates.lock().unwrap();
        for (_, filters, _) in calls.iter() {
            assert!(!filters.iter().any(|f| f.field == "partner_id"));
        }
    }

    #[tokio::test]
    async fn moderation_reads_oldest_first_with_fixed_limit() {
        let (engine, store) = engine(RecordingStore::default());

        let req = request(Intent::Moderation, AccessScope::Unrestricted);
        engine.handle(&req, &ctx()).await.unwrap();

        let queries = store.queries.lock().unwrap();
        let (collection, _, order_by, limit) = &queries[0];
        assert_eq!(*collection, Collection::PendingApprovals);
        assert_eq!(order_by, &vec![OrderBy::asc("submitted_at")]);
        assert_eq!(*limit, 50);
    }

    #[tokio::test]
    async fn store_timeout_surfaces_as_unavailable() {
        let (engine, _) = engine(RecordingStore::failing());

        let req = request(Intent::Moderation, AccessScope::Unrestricted);
        assert!(matches!(
            engine.handle(&req, &ctx()).await.unwrap_err(),
            DataError::StoreUnavailable
        ));
    }

    #[tokio::test]
    async fn rag_intent_is_rejected() {
        let (engine, _) = engine(RecordingStore::default());

        let req = request(Intent::Policy, AccessScope::Unrestricted);
        assert!(matches!(
            engine.handle(&req, &ctx()).await.unwrap_err(),
            DataError::UnsupportedIntent(Intent::Policy)
        ));
    }

    #[tokio::test]
    async fn expired_context_is_deadline_exceeded() {
        let (engine, _) = engine(RecordingStore::default());

        let req = request(Intent::Moderation, AccessScope::Unrestricted);
        let expired = QueryContext::new(Duration::ZERO);
        assert!(matches!(
            engine.handle(&req, &expired).await.unwrap_err(),
            DataError::DeadlineExceeded
        ));
    }
}
