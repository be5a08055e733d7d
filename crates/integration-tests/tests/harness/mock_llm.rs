//! Mock LLM backend speaking the provider wire shape
//!
//! Accepts `{model, messages, temperature, max_tokens}` and returns
//! `{text}`, with programmable failures for failover scenarios.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default canned reply; numberless so any formatting pass survives the
/// templater
const DEFAULT_RESPONSE: &str = "These picks fit what you asked for.";

pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    request_count: AtomicU32,
    /// Requests to fail before succeeding; `u32::MAX` fails forever
    fail_count: AtomicU32,
    fail_status: StatusCode,
    response_text: String,
}

impl MockLlm {
    /// Healthy mock with the default reply
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(0, StatusCode::INTERNAL_SERVER_ERROR, DEFAULT_RESPONSE).await
    }

    /// Healthy mock with a custom reply
    pub async fn start_with_response(text: &str) -> anyhow::Result<Self> {
        Self::start_inner(0, StatusCode::INTERNAL_SERVER_ERROR, text).await
    }

    /// Mock that always fails with the given status
    pub async fn start_failing(status: StatusCode) -> anyhow::Result<Self> {
        Self::start_inner(u32::MAX, status, DEFAULT_RESPONSE).await
    }

    /// Mock that fails the first `n` requests, then succeeds
    pub async fn start_flaky(n: u32, status: StatusCode) -> anyhow::Result<Self> {
        Self::start_inner(n, status, DEFAULT_RESPONSE).await
    }

    async fn start_inner(fail_count: u32, fail_status: StatusCode, text: &str) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            request_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(fail_count),
            fail_status,
            response_text: text.to_owned(),
        });

        let app = Router::new()
            .route("/", routing::post(handle_chat))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to configure as a provider endpoint
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("valid mock url")
    }

    /// Completion requests received so far
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::SeqCst)
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_chat(
    State(state): State<Arc<MockState>>,
    Json(request): Json<serde_json::Value>,
) -> axum::response::Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);

    // Sanity-check the wire shape without being strict about content
    assert!(request.get("model").is_some(), "missing model");
    assert!(
        request.get("messages").and_then(serde_json::Value::as_array).is_some(),
        "missing messages"
    );

    let remaining = state.fail_count.load(Ordering::SeqCst);
    if remaining > 0 {
        if remaining != u32::MAX {
            state.fail_count.fetch_sub(1, Ordering::SeqCst);
        }
        return (state.fail_status, "mock failure").into_response();
    }

    Json(serde_json::json!({ "text": state.response_text })).into_response()
}
