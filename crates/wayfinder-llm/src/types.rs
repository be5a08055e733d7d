/// Hard ceiling on sampling temperature for any core-initiated call
pub const MAX_TEMPERATURE: f64 = 0.4;

/// A completion request as composed by a calling engine
///
/// The system prompt always comes from the engine, never from the caller.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    temperature: f64,
}

impl LlmRequest {
    /// Build a request, clamping temperature to [`MAX_TEMPERATURE`]
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
            temperature: temperature.clamp(0.0, MAX_TEMPERATURE),
        }
    }

    pub const fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// A completed response with provenance
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    /// Which configured provider produced the text
    pub provider_id: String,
    pub latency_ms: u64,
}
