#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! LLM provider pool and failover gateway
//!
//! [`pool::ProviderPool`] wraps each configured provider with a total
//! budget, jittered-backoff retries, and circuit-breaker health tracking.
//! [`gateway::LlmGateway`] walks the pool in configured order, records
//! fallback events, and degrades to [`error::GatewayError::Unavailable`]
//! when every provider is exhausted; callers degrade, never retry.

pub mod error;
pub mod gateway;
mod health;
pub mod pool;
pub mod provider;
pub mod retry;
pub mod types;

pub use error::{GatewayError, ProviderError};
pub use gateway::LlmGateway;
pub use health::HealthTracker;
pub use pool::ProviderPool;
pub use provider::{ChatProvider, HttpChatProvider};
pub use retry::RetryPolicy;
pub use types::{LlmRequest, LlmResponse};
