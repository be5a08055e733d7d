#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Shared domain types for Wayfinder
//!
//! Everything here is request-scoped and owned by exactly one component at
//! a time: the classifier produces `IntentClassification`, the validator
//! produces `AccessDecision`, and the router alone assembles the final
//! `QueryResponse`.

pub mod context;
pub mod intent;
pub mod request;
pub mod response;

pub use context::QueryContext;
pub use intent::{ClassificationMethod, Intent, IntentClassification, Role};
pub use request::{QueryOptions, QueryRequest, RequestError};
pub use response::{
    AccessDecision, AccessScope, Citation, DataSource, Record, RefusalReason, ResponseMetadata,
    QueryResponse,
};
