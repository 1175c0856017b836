//! HTTP request handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info};

use super::state::AppState;
use crate::metrics;

/// Shortest accepted query, in characters.
pub const MIN_QUERY_CHARS: usize = 3;

/// Largest accepted `top_k`.
pub const MAX_TOP_K: usize = 100;

/// Query string of `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub top_k: Option<usize>,
}

/// Error body shared by all failing responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { detail: detail.into() })).into_response()
}

/// Check the query parameters, returning the query text and `top_k`.
pub fn validate(params: SearchParams, default_top_k: usize) -> Result<(String, usize), String> {
    let query = params.query.ok_or_else(|| "query: field required".to_string())?;
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(format!(
            "query: must be at least {} characters",
            MIN_QUERY_CHARS
        ));
    }

    let top_k = params.top_k.unwrap_or(default_top_k);
    if !(1..=MAX_TOP_K).contains(&top_k) {
        return Err(format!("top_k: must be between 1 and {}", MAX_TOP_K));
    }

    Ok((query, top_k))
}

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Hello World" }))
}

/// Hybrid search.
///
/// GET /search?query=<text>&top_k=<n>
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
        }
    };

    let (query, top_k) = match validate(params, state.config.search.default_top_k) {
        Ok(valid) => valid,
        Err(detail) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, detail),
    };

    let start = Instant::now();
    info!(query = %query, top_k = top_k, "Processing search request");

    match state.search.search(&query, top_k).await {
        Ok(results) => {
            info!(
                results = results.len(),
                took_ms = start.elapsed().as_millis() as u64,
                "Search completed"
            );
            Json(results).into_response()
        }
        Err(e) => {
            let detail = format!("Search failed: {}", e);
            // the chain names the upstream cause; it stays in the log
            error!(
                backend = e.backend(),
                error = %format!("{:#}", anyhow::Error::new(e)),
                "Search failed"
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, detail)
        }
    }
}

/// Health check endpoint.
///
/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Prometheus metrics endpoint.
///
/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    let output = metrics::gather_metrics();
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], output)
}
