//! Local stand-in for the vector service's control and data planes.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use super::test_utils::spawn_server;
use qasearch::config::PineconeConfig;

pub const API_KEY: &str = "test-key";

#[derive(Default)]
pub struct MockPinecone {
    pub base_url: OnceLock<String>,
    pub index_exists: AtomicBool,
    pub fail_search: AtomicBool,
    pub create_requests: Mutex<Vec<Value>>,
    pub upsert_batches: Mutex<Vec<Vec<Value>>>,
    pub search_requests: Mutex<Vec<Value>>,
    pub api_keys: Mutex<Vec<String>>,
}

impl MockPinecone {
    /// Start the mock and return it with a client config pointing at it.
    pub async fn start() -> (Arc<Self>, PineconeConfig) {
        let mock = Arc::new(Self::default());
        let router = Router::new()
            .route("/indexes/{name}", get(describe_index))
            .route("/indexes/create-for-model", post(create_index))
            .route("/records/namespaces/{ns}/upsert", post(upsert))
            .route("/records/namespaces/{ns}/search", post(search))
            .with_state(mock.clone());

        let base = spawn_server(router).await;
        let _ = mock.base_url.set(base.clone());

        let config = PineconeConfig {
            api_key: API_KEY.to_string(),
            control_url: base,
            index_host: None,
            ..PineconeConfig::default()
        };
        (mock, config)
    }

    pub fn upserted_batch_sizes(&self) -> Vec<usize> {
        self.upsert_batches.lock().unwrap().iter().map(Vec::len).collect()
    }
}

fn record_key(mock: &MockPinecone, headers: &HeaderMap) {
    if let Some(key) = headers.get("Api-Key").and_then(|v| v.to_str().ok()) {
        mock.api_keys.lock().unwrap().push(key.to_string());
    }
}

async fn describe_index(
    State(mock): State<Arc<MockPinecone>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record_key(&mock, &headers);
    if !mock.index_exists.load(Ordering::SeqCst) {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})));
    }
    let host = mock.base_url.get().cloned().unwrap_or_default();
    (StatusCode::OK, Json(json!({"name": name, "host": host})))
}

async fn create_index(
    State(mock): State<Arc<MockPinecone>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record_key(&mock, &headers);
    mock.create_requests.lock().unwrap().push(body);
    mock.index_exists.store(true, Ordering::SeqCst);
    (StatusCode::CREATED, Json(json!({"status": "Initializing"})))
}

async fn upsert(
    State(mock): State<Arc<MockPinecone>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    record_key(&mock, &headers);
    let records: Vec<Value> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    mock.upsert_batches.lock().unwrap().push(records);
    StatusCode::CREATED
}

async fn search(
    State(mock): State<Arc<MockPinecone>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record_key(&mock, &headers);
    mock.search_requests.lock().unwrap().push(body);
    if mock.fail_search.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "unavailable"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "result": {
                "hits": [
                    {"_id": "1", "_score": 0.9, "fields": {"title": "T1", "url": "u1"}},
                    {"_id": "3", "_score": 0.4, "fields": {"title": "T3", "url": "u3"}}
                ]
            },
            "usage": {"read_units": 1}
        })),
    )
}
