//! Stable event names carried in the `event` field of tracing records
//!
//! Every event also carries the query's `correlation_id`; component-specific
//! fields ride alongside. Names are part of the operational contract and
//! must not change between releases.

pub const QUERY_RECEIVED: &str = "query_received";
pub const INTENT_CLASSIFIED: &str = "intent_classified";
pub const ACCESS_ALLOWED: &str = "access_allowed";
pub const ACCESS_DENIED: &str = "access_denied";
pub const ROUTE_SELECTED: &str = "route_selected";
pub const STORE_QUERY_COMPLETE: &str = "store_query_complete";
pub const RAG_QUERY_COMPLETE: &str = "rag_query_complete";
pub const LLM_CALL: &str = "llm_call";
pub const LLM_FALLBACK: &str = "llm_fallback";
pub const QUERY_COMPLETE: &str = "query_complete";
pub const QUERY_ERROR: &str = "query_error";
