//! Provider seam and the JSON-over-HTTP implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;
use wayfinder_config::ProviderConfig;

use crate::error::ProviderError;
use crate::types::LlmRequest;

/// One language-model backend
///
/// Implementations make a single attempt per call; retries and budgets
/// belong to the pool.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Stable identifier from configuration
    fn id(&self) -> &str;

    /// Send one completion attempt within `budget`
    async fn complete(&self, request: &LlmRequest, budget: Duration) -> Result<String, ProviderError>;
}

// -- Wire types --
// Every provider speaks the same chat shape:
// `{model, messages: [{role, content}], temperature, max_tokens}` -> `{text}`

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    text: String,
}

/// JSON-over-HTTP chat provider
pub struct HttpChatProvider {
    id: String,
    client: Client,
    base_url: Url,
    api_key: SecretString,
    model: String,
}

impl HttpChatProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            id: config.id.clone(),
            client: Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Map an HTTP status to the terminal error class
    fn classify_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Auth(format!("status {status}"))
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after },
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::Timeout,
            _ => ProviderError::Other(format!("status {status}: {body}")),
        }
    }
}

#[async_trait]
impl ChatProvider for HttpChatProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn complete(&self, request: &LlmRequest, budget: Duration) -> Result<String, ProviderError> {
        let wire_request = WireRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature(),
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.base_url.clone())
            .bearer_auth(self.api_key.expose_secret())
            .timeout(budget)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Other(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = %self.id, status = %status, "provider returned error");
            return Err(Self::classify_status(status, &body, retry_after));
        }

        let wire_response: WireResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(format!("unparseable provider response: {e}")))?;

        Ok(wire_response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_are_non_retryable() {
        let error = HttpChatProvider::classify_status(StatusCode::UNAUTHORIZED, "", None);
        assert!(matches!(error, ProviderError::Auth(_)));
        assert!(!error.is_retryable());
    }

    #[test]
    fn rate_limit_keeps_server_hint() {
        let error = HttpChatProvider::classify_status(StatusCode::TOO_MANY_REQUESTS, "", Some(7));
        assert!(matches!(error, ProviderError::RateLimited { retry_after: Some(7) }));
    }

    #[test]
    fn gateway_timeout_maps_to_timeout() {
        let error = HttpChatProvider::classify_status(StatusCode::GATEWAY_TIMEOUT, "", None);
        assert!(matches!(error, ProviderError::Timeout));
    }

    #[test]
    fn server_errors_are_other() {
        let error = HttpChatProvider::classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom", None);
        assert!(matches!(error, ProviderError::Other(_)));
    }
}
