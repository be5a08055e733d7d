#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Observability for Wayfinder
//!
//! Structured events ride the `tracing` ecosystem with stable names from
//! [`events`]; in-process metrics live in a [`Metrics`] registry that every
//! component increments and the deployable exposes as a snapshot.

pub mod events;
mod latency;
pub mod metrics;

pub use latency::LatencyWindow;
pub use metrics::{Metrics, MetricsSnapshot};
