use thiserror::Error;

/// Terminal error classes a single provider can surface
///
/// The class survives retry exhaustion unchanged so the gateway can key
/// fallback events by it.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider did not answer within its budget
    #[error("provider timed out")]
    Timeout,

    /// The provider shed load; `retry_after` carries the server hint
    #[error("provider rate limited")]
    RateLimited { retry_after: Option<u64> },

    /// Credentials rejected; retrying cannot help
    #[error("provider rejected credentials: {0}")]
    Auth(String),

    /// Anything else the provider returned
    #[error("provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Whether the pool may retry this error within one provider
    ///
    /// Only timeouts and rate limits are retried in place; `Other` is
    /// terminal for the provider but still triggers gateway failover.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimited { .. })
    }

    /// Whether the gateway should advance to the next provider
    pub const fn triggers_failover(&self) -> bool {
        !matches!(self, Self::Auth(_))
    }

    /// Stable class label used in fallback counter keys and events
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Auth(_) => "auth",
            Self::Other(_) => "other",
        }
    }
}

/// Errors surfaced by the failover gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Every configured provider failed or could not be attempted within
    /// the remaining deadline
    #[error("no llm provider available")]
    Unavailable,
}
