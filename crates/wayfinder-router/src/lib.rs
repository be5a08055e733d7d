#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Top-level query orchestration
//!
//! The router owns the envelope: engines raise typed errors and the
//! router is the single place that converts them into responses. Flow per
//! query: classify, validate, dispatch on the fixed route table, then
//! optionally format, all under one wall-clock budget.

pub mod format;
pub mod route;
pub mod summary;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use wayfinder_classifier::Classifier;
use wayfinder_config::{RagConfig, RouterConfig};
use wayfinder_core::{
    AccessDecision, AccessScope, Citation, ClassificationMethod, DataSource, Intent,
    IntentClassification, QueryContext, QueryRequest, QueryResponse, Record, RefusalReason,
    RequestError, ResponseMetadata,
};
use wayfinder_data::{AggregateValue, Aggregates, DataEngine, DataError, DataRequest};
use wayfinder_llm::{LlmGateway, LlmRequest};
use wayfinder_observability::{Metrics, events};
use wayfinder_rag::{INSUFFICIENT_CONTEXT_TEXT, RagEngine, RagError, RagOutcome, RagRequest};

use route::{Route, route_for};

/// Output bound for the cosmetic formatting pass
const FORMAT_MAX_TOKENS: u32 = 256;
/// Formatting temperature, at the global clamp
const FORMAT_TEMPERATURE: f64 = 0.4;

/// Static response text per refusal reason; never includes internals
const fn refusal_text(reason: RefusalReason) -> &'static str {
    match reason {
        RefusalReason::RoleForbidden => "You don't have access to that information.",
        RefusalReason::ScopeMismatch => "You can only view data for your own partner account.",
        RefusalReason::StoreUnavailable => {
            "The data service is temporarily unavailable. Please try again."
        }
        RefusalReason::Timeout => "The request took too long to complete. Please try again.",
        RefusalReason::InternalError => "Something went wrong while handling your request.",
        RefusalReason::Overloaded => {
            "The service is handling too many requests right now. Please retry shortly."
        }
        RefusalReason::RagCannotServeLiveData => {
            "Live marketplace figures come from your dashboard data, not from help content."
        }
    }
}

/// What a route produced, before metadata is attached
struct Outcome {
    data_source: DataSource,
    response: String,
    records: Option<Vec<Record>>,
    citations: Option<Vec<Citation>>,
    llm_provider: Option<String>,
    llm_used: bool,
    denial_reason: Option<RefusalReason>,
}

impl Outcome {
    fn refusal(reason: RefusalReason) -> Self {
        Self {
            data_source: DataSource::Refused,
            response: refusal_text(reason).to_owned(),
            records: None,
            citations: None,
            llm_provider: None,
            llm_used: false,
            denial_reason: Some(reason),
        }
    }
}

struct RouterInner {
    classifier: Classifier,
    data: DataEngine,
    rag: RagEngine,
    gateway: Arc<LlmGateway>,
    metrics: Arc<Metrics>,
    total_budget: Duration,
    rag_top_k: usize,
    in_flight: Semaphore,
}

/// The query router; cheap to clone, shared across tasks
#[derive(Clone)]
pub struct QueryRouter {
    inner: Arc<RouterInner>,
}

impl QueryRouter {
    pub fn new(
        classifier: Classifier,
        data: DataEngine,
        rag: RagEngine,
        gateway: Arc<LlmGateway>,
        metrics: Arc<Metrics>,
        router_config: &RouterConfig,
        rag_config: &RagConfig,
    ) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                classifier,
                data,
                rag,
                gateway,
                metrics,
                total_budget: Duration::from_millis(router_config.total_timeout_ms),
                rag_top_k: rag_config.top_k,
                in_flight: Semaphore::new(router_config.max_in_flight),
            }),
        }
    }

    /// Handle one authenticated query end to end
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] only for malformed requests (a caller
    /// bug); every runtime failure is expressed inside the envelope.
    #[allow(clippy::too_many_lines)]
    pub async fn handle(&self, request: QueryRequest) -> Result<QueryResponse, RequestError> {
        let request = request.validate()?;

        // Backpressure: beyond the cap we refuse fast, never queue
        let Ok(_permit) = self.inner.in_flight.try_acquire() else {
            self.inner.metrics.record_refusal(RefusalReason::Overloaded);
            let ctx = QueryContext::new(self.inner.total_budget);
            tracing::warn!(
                correlation_id = %ctx.correlation_id(),
                event = events::QUERY_ERROR,
                reason = %RefusalReason::Overloaded,
                "query rejected at the concurrency cap"
            );
            return Ok(self.finish(
                &ctx,
                &request,
                &unclassified(),
                Outcome::refusal(RefusalReason::Overloaded),
            ));
        };

        let ctx = QueryContext::new(self.inner.total_budget);
        tracing::info!(
            correlation_id = %ctx.correlation_id(),
            event = events::QUERY_RECEIVED,
            role = %request.role,
            query_chars = request.query.chars().count(),
            "query received"
        );

        // Stage 1: classification; never fails
        let classification = self.inner.classifier.classify(&request.query).await;
        self.inner.metrics.record_query(classification.intent);
        tracing::info!(
            correlation_id = %ctx.correlation_id(),
            event = events::INTENT_CLASSIFIED,
            intent = %classification.intent,
            confidence = classification.confidence,
            method = %classification.method,
            latency_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX),
            "intent classified"
        );

        // Stage 2: authorization, before any engine work
        let scope = match wayfinder_access::validate(
            classification.intent,
            request.role,
            &request.user_id,
            request.partner_id.as_deref(),
        ) {
            AccessDecision::Denied { reason } => {
                self.inner.metrics.record_refusal(reason);
                tracing::info!(
                    correlation_id = %ctx.correlation_id(),
                    event = events::ACCESS_DENIED,
                    intent = %classification.intent,
                    role = %request.role,
                    reason = %reason,
                    "access denied"
                );
                return Ok(self.finish(&ctx, &request, &classification, Outcome::refusal(reason)));
            }
            AccessDecision::Allowed { scope } => {
                tracing::debug!(
                    correlation_id = %ctx.correlation_id(),
                    event = events::ACCESS_ALLOWED,
                    intent = %classification.intent,
                    role = %request.role,
                    "access allowed"
                );
                scope
            }
        };

        // Stage 3: route dispatch under the remaining budget
        let selected = route_for(classification.intent);
        tracing::debug!(
            correlation_id = %ctx.correlation_id(),
            event = events::ROUTE_SELECTED,
            intent = %classification.intent,
            route = ?selected,
            "route selected"
        );

        let outcome = match ctx.remaining() {
            None => Outcome::refusal(RefusalReason::Timeout),
            Some(remaining) => {
                let dispatched = tokio::time::timeout(remaining, async {
                    match selected {
                        Route::Database => {
                            self.database_route(&request, &classification, scope, &ctx).await
                        }
                        Route::Rag => self.rag_route(&request, &classification, &ctx).await,
                    }
                })
                .await;
                match dispatched {
                    Ok(outcome) => outcome,
                    Err(_elapsed) => Outcome::refusal(RefusalReason::Timeout),
                }
            }
        };

        if let Some(reason) = outcome.denial_reason {
            self.inner.metrics.record_refusal(reason);
        }

        Ok(self.finish(&ctx, &request, &classification, outcome))
    }

    /// Attach metadata, record latency, emit the completion event
    fn finish(
        &self,
        ctx: &QueryContext,
        request: &QueryRequest,
        classification: &IntentClassification,
        outcome: Outcome,
    ) -> QueryResponse {
        let latency_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.inner.metrics.record_latency(latency_ms);

        tracing::info!(
            correlation_id = %ctx.correlation_id(),
            event = events::QUERY_COMPLETE,
            intent = %classification.intent,
            data_source = %outcome.data_source,
            llm_used = outcome.llm_used,
            latency_ms,
            "query complete"
        );

        QueryResponse {
            intent: classification.intent,
            role_scope: request.role,
            data_source: outcome.data_source,
            response: outcome.response,
            records: outcome.records,
            citations: outcome.citations,
            metadata: ResponseMetadata {
                latency_ms,
                intent_confidence: classification.confidence,
                classification_method: classification.method,
                llm_provider: outcome.llm_provider,
                llm_used: outcome.llm_used,
                denial_reason: outcome.denial_reason,
            },
        }
    }

    async fn database_route(
        &self,
        request: &QueryRequest,
        classification: &IntentClassification,
        scope: AccessScope,
        ctx: &QueryContext,
    ) -> Outcome {
        let data_request = DataRequest {
            intent: classification.intent,
            query: request.query.clone(),
            scope,
            time_range: None,
            limit: request.options.max_records,
        };

        let result = match self.inner.data.handle(&data_request, ctx).await {
            Ok(result) => result,
            Err(error) => return Self::data_failure(&error, ctx),
        };

        match classification.intent {
            Intent::Recommendation | Intent::SavedItems => {
                let (response, llm_provider, llm_used) = self
                    .maybe_format(
                        classification.intent,
                        &result.records,
                        request.options.include_raw,
                        ctx,
                    )
                    .await;
                Outcome {
                    data_source: DataSource::Database,
                    response,
                    records: Some(result.records),
                    citations: None,
                    llm_provider,
                    llm_used,
                    denial_reason: None,
                }
            }
            // Aggregates never pass through a model; text is deterministic
            Intent::Analytics | Intent::Revenue => {
                let aggregates = result.aggregates.unwrap_or_default();
                let response = if classification.intent == Intent::Analytics {
                    summary::analytics(&aggregates)
                } else {
                    summary::revenue(&aggregates)
                };
                Outcome {
                    data_source: DataSource::Database,
                    response,
                    records: Some(vec![aggregates_record(&aggregates)]),
                    citations: None,
                    llm_provider: None,
                    llm_used: false,
                    denial_reason: None,
                }
            }
            Intent::Moderation => Outcome {
                data_source: DataSource::Database,
                response: summary::moderation(&result.records),
                records: Some(result.records),
                citations: None,
                llm_provider: None,
                llm_used: false,
                denial_reason: None,
            },
            // The route table sent a rag intent here; treat as a bug
            _ => {
                tracing::error!(
                    correlation_id = %ctx.correlation_id(),
                    intent = %classification.intent,
                    "non-data intent dispatched to the database route"
                );
                Outcome::refusal(RefusalReason::InternalError)
            }
        }
    }

    async fn rag_route(
        &self,
        request: &QueryRequest,
        classification: &IntentClassification,
        ctx: &QueryContext,
    ) -> Outcome {
        let rag_request = RagRequest {
            query: request.query.clone(),
            intent: classification.intent,
            k: self.inner.rag_top_k,
        };

        match self.inner.rag.handle(&rag_request, ctx).await {
            Ok(RagOutcome::Answer(answer)) => Outcome {
                data_source: DataSource::Rag,
                response: answer.text,
                records: None,
                citations: Some(answer.citations),
                llm_used: answer.provider_id.is_some(),
                llm_provider: answer.provider_id,
                denial_reason: None,
            },
            Ok(RagOutcome::InsufficientContext) => Outcome {
                data_source: DataSource::Rag,
                response: INSUFFICIENT_CONTEXT_TEXT.to_owned(),
                records: None,
                citations: Some(Vec::new()),
                llm_provider: None,
                llm_used: false,
                denial_reason: None,
            },
            Ok(RagOutcome::CannotServeLiveData) => {
                Outcome::refusal(RefusalReason::RagCannotServeLiveData)
            }
            Err(RagError::StoreUnavailable) => Outcome::refusal(RefusalReason::StoreUnavailable),
            Err(RagError::DeadlineExceeded) => Outcome::refusal(RefusalReason::Timeout),
        }
    }

    /// Optional cosmetic formatting for browsing intents
    ///
    /// Returns `(response_text, provider, llm_used)`. The structured
    /// summary is the fallback whenever the model is skipped, fails, or
    /// produces prose that the numeric templater rejects.
    async fn maybe_format(
        &self,
        intent: Intent,
        records: &[Record],
        include_raw: bool,
        ctx: &QueryContext,
    ) -> (String, Option<String>, bool) {
        let fallback = if intent == Intent::SavedItems {
            summary::saved_items(records)
        } else {
            summary::recommendations(records)
        };

        if include_raw || records.is_empty() || !self.inner.gateway.any_available() {
            return (fallback, None, false);
        }

        let llm_request = LlmRequest::new(
            format::FORMAT_SYSTEM_PROMPT,
            format::build_format_prompt(records),
            FORMAT_MAX_TOKENS,
            FORMAT_TEMPERATURE,
        );

        match self.inner.gateway.complete(&llm_request, ctx).await {
            Ok(response) => match format::render(&response.text, records) {
                Some(prose) => (prose, Some(response.provider_id), true),
                None => {
                    tracing::warn!(
                        correlation_id = %ctx.correlation_id(),
                        provider = %response.provider_id,
                        "formatting prose rejected by the numeric templater"
                    );
                    (fallback, None, false)
                }
            },
            Err(error) => {
                tracing::warn!(
                    correlation_id = %ctx.correlation_id(),
                    error = %error,
                    "formatting skipped, llm unavailable"
                );
                (fallback, None, false)
            }
        }
    }

    fn data_failure(error: &DataError, ctx: &QueryContext) -> Outcome {
        match error {
            DataError::StoreUnavailable => Outcome::refusal(RefusalReason::StoreUnavailable),
            DataError::DeadlineExceeded => Outcome::refusal(RefusalReason::Timeout),
            DataError::UnsupportedIntent(_) | DataError::InvalidScope(_) => {
                tracing::error!(
                    correlation_id = %ctx.correlation_id(),
                    error = %error,
                    "data engine dispatch bug"
                );
                Outcome::refusal(RefusalReason::InternalError)
            }
        }
    }

    /// Snapshot of the in-process metrics registry
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}

/// Placeholder classification for envelopes built before classification
fn unclassified() -> IntentClassification {
    IntentClassification {
        intent: Intent::Recommendation,
        confidence: 0.0,
        method: ClassificationMethod::Default,
        matched_terms: Vec::new(),
    }
}

/// Flatten typed aggregates into one envelope record
fn aggregates_record(aggregates: &Aggregates) -> Record {
    let mut record = Record::new();
    for (name, value) in aggregates {
        match value {
            AggregateValue::Count(count) => {
                record.insert(name.clone(), serde_json::Value::from(*count));
            }
            AggregateValue::Sums(sums) => {
                let amounts: Vec<serde_json::Value> = sums
                    .iter()
                    .map(|sum| {
                        serde_json::json!({
                            "amount": sum.amount,
                            "currency": sum.currency,
                        })
                    })
                    .collect();
                record.insert(name.clone(), serde_json::Value::Array(amounts));
            }
        }
    }
    record
}
