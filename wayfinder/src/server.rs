//! Thin HTTP adapter over the core router
//!
//! Identity is assumed to be resolved upstream; this surface only decodes
//! the authenticated tuple and hands it to the core.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use wayfinder_core::QueryRequest;
use wayfinder_router::QueryRouter;

/// Build the serving router
pub fn app(router: QueryRouter) -> Router {
    Router::new()
        .route("/query", routing::post(handle_query))
        .route("/metrics", routing::get(handle_metrics))
        .route("/health", routing::get(handle_health))
        .with_state(router)
}

/// Handle `POST /query`
async fn handle_query(
    State(router): State<QueryRouter>,
    Json(request): Json<QueryRequest>,
) -> Response {
    match router.handle(request).await {
        Ok(response) => Json(response).into_response(),
        Err(error) => {
            // Caller bug; static message, logged at info
            tracing::info!(error = %error, "rejected malformed query request");
            let body = serde_json::json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

/// Handle `GET /metrics`
#[allow(clippy::unused_async)]
async fn handle_metrics(State(router): State<QueryRouter>) -> Response {
    Json(router.metrics().snapshot()).into_response()
}

/// Handle `GET /health`
#[allow(clippy::unused_async)]
async fn handle_health() -> Response {
    Json(serde_json::json!({ "status": "ok" })).into_response()
}
