use anyhow::Result;
use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::TempDir;

use crate::helpers::mock_pinecone::MockPinecone;
use crate::helpers::test_utils::spawn_server;
use qasearch::config::Config;
use qasearch::pipeline::{Pipeline, RetryPolicy};
use qasearch::records::load_questions;

#[derive(Deserialize)]
struct PageParams {
    page: u32,
}

/// Two full pages and a short third one, 25 questions in total.
async fn questions_api(Query(params): Query<PageParams>) -> Json<Value> {
    let start = (params.page - 1) * 10;
    let end = (start + 10).min(25);
    let data: Vec<Value> = (start..end)
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Вопрос про Rust №{}", id),
                "shortAnswer": format!("<p>Ответ {}</p>", id),
                "keywords": ["rust", "backend"],
                "createdAt": "2024-05-01T12:00:00.000Z"
            })
        })
        .collect();
    Json(json!({ "data": data, "page": params.page, "limit": 10, "total": 25 }))
}

async fn config_with_mocks(dir: &TempDir) -> (Config, std::sync::Arc<MockPinecone>) {
    let api = spawn_server(Router::new().route("/public-questions", get(questions_api))).await;
    let (mock, pinecone) = MockPinecone::start().await;

    let mut config = Config::default();
    config.crawl.api_url_template = format!("{}/public-questions?page={{page}}&limit=10", api);
    config.crawl.json_dir = dir.path().join("json");
    config.crawl.raw_dir = dir.path().join("raw");
    config.pinecone = pinecone;
    (config, mock)
}

#[tokio::test]
async fn test_crawl_then_index() -> Result<()> {
    let dir = TempDir::new()?;
    let (config, mock) = config_with_mocks(&dir).await;
    let pipeline = Pipeline::new(config.clone()).with_retry(RetryPolicy::new(0, Duration::ZERO));

    assert_eq!(pipeline.crawl().await?, 3);

    let records = load_questions(&config.crawl.json_dir)?;
    assert_eq!(records.len(), 25);

    let upserted = pipeline.upsert_vectors().await?;
    assert_eq!(upserted, 25);
    assert!(mock.index_exists.load(Ordering::SeqCst));
    assert_eq!(mock.upserted_batch_sizes(), vec![25]);

    let batches = mock.upsert_batches.lock().unwrap();
    let first = &batches[0][0];
    assert_eq!(first["_id"], "0");
    assert_eq!(first["url"], "https://yeahub.ru/questions/0");
    assert_eq!(first["tags"], json!(["rust", "backend"]));
    Ok(())
}

#[tokio::test]
async fn test_index_respects_batch_size() -> Result<()> {
    let dir = TempDir::new()?;
    let (mut config, mock) = config_with_mocks(&dir).await;
    config.pinecone.upsert_batch_size = 10;
    let pipeline = Pipeline::new(config);

    pipeline.crawl().await?;
    pipeline.upsert_vectors().await?;

    assert_eq!(mock.upserted_batch_sizes(), vec![10, 10, 5]);
    Ok(())
}

#[tokio::test]
async fn test_index_without_crawl_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let (config, mock) = config_with_mocks(&dir).await;

    let err = Pipeline::new(config).upsert_vectors().await.unwrap_err();
    assert!(format!("{:#}", err).contains("does not exist"));
    assert!(mock.create_requests.lock().unwrap().is_empty());
    Ok(())
}
