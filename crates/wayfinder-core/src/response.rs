use serde::Serialize;

use crate::intent::{ClassificationMethod, Intent, Role};

/// A single record drawn from the store, opaque to the core
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Where the answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataSource {
    Database,
    Rag,
    /// Reserved for mixed DB + retrieval answers; nothing produces it in v1
    Hybrid,
    Refused,
}

/// Machine-readable reason attached to every refused envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefusalReason {
    RoleForbidden,
    ScopeMismatch,
    StoreUnavailable,
    Timeout,
    InternalError,
    Overloaded,
    RagCannotServeLiveData,
}

/// Scope an allowed query must constrain its reads by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// System-wide reads (admin analytics/revenue, shared knowledge)
    Unrestricted,
    /// Reads limited to the calling user's own records
    User(String),
    /// Reads limited to a single partner
    Partner(String),
}

/// Outcome of role/scope validation
///
/// When the decision is `Allowed` for a partner-scoped intent, the scope
/// carries exactly one partner id that downstream queries must filter by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed { scope: AccessScope },
    Denied { reason: RefusalReason },
}

impl AccessDecision {
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// A retrieval citation exposed on the envelope
#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    pub source_id: String,
    pub score: f64,
}

/// Per-response diagnostic metadata
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub latency_ms: u64,
    pub intent_confidence: f64,
    pub classification_method: ClassificationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_provider: Option<String>,
    pub llm_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<RefusalReason>,
}

/// The public response envelope, assembled exclusively by the router
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub intent: Intent,
    pub role_scope: Role,
    pub data_source: DataSource,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    pub metadata: ResponseMetadata,
}
