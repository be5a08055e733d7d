#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Deterministic structured-data engine
//!
//! Every answer here is drawn from the record store; no language model
//! ever touches these reads. Aggregates stay typed numerics end to end.

pub mod engine;
pub mod extract;
mod http;
pub mod score;
pub mod store;

pub use engine::{DataEngine, DataError, DataRequest, DataResult, TimeRange};
pub use extract::{QueryTerms, extract_terms};
pub use http::HttpRecordStore;
pub use store::{
    AggregateOp, AggregateValue, Aggregates, Collection, CurrencyAmount, Filter, FilterOp, OrderBy,
    RecordStore, StoreError,
};
