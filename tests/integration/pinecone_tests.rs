use anyhow::Result;
use std::sync::atomic::Ordering;

use crate::helpers::mock_pinecone::{MockPinecone, API_KEY};
use qasearch::records::VectorRecord;
use qasearch::storage::PineconeClient;

fn vector_records(count: usize) -> Vec<VectorRecord> {
    (0..count)
        .map(|i| VectorRecord {
            id: i.to_string(),
            title: format!("Question {}", i),
            tags: vec!["rust".to_string()],
            url: format!("https://example.com/q/{}", i),
        })
        .collect()
}

#[tokio::test]
async fn test_create_index_only_when_missing() -> Result<()> {
    let (mock, config) = MockPinecone::start().await;
    let client = PineconeClient::new(&config)?;

    assert!(!client.has_index().await?);
    assert!(client.create_index().await?);
    assert!(client.has_index().await?);
    assert!(!client.create_index().await?, "Second call must not recreate");

    let requests = mock.create_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["name"], "questions");
    assert_eq!(requests[0]["embed"]["model"], "llama-text-embed-v2");
    assert_eq!(requests[0]["embed"]["field_map"]["text"], "title");

    assert!(mock.api_keys.lock().unwrap().iter().all(|k| k == API_KEY));
    Ok(())
}

#[tokio::test]
async fn test_upsert_splits_into_batches() -> Result<()> {
    let (mock, config) = MockPinecone::start().await;
    let client = PineconeClient::new(&config)?;
    client.create_index().await?;

    let sent = client.upsert_records(&vector_records(105)).await?;

    assert_eq!(sent, 105);
    assert_eq!(mock.upserted_batch_sizes(), vec![50, 50, 5]);

    let batches = mock.upsert_batches.lock().unwrap();
    assert_eq!(batches[0][0]["_id"], "0");
    assert_eq!(batches[2][4]["_id"], "104");
    assert_eq!(batches[0][0]["tags"][0], "rust");
    Ok(())
}

#[tokio::test]
async fn test_upsert_fails_without_index() -> Result<()> {
    let (_mock, config) = MockPinecone::start().await;
    let client = PineconeClient::new(&config)?;

    let err = client.upsert_records(&vector_records(1)).await.unwrap_err();
    assert!(err.to_string().contains("does not exist"));
    Ok(())
}

#[tokio::test]
async fn test_search_parses_hits() -> Result<()> {
    let (mock, config) = MockPinecone::start().await;
    mock.index_exists.store(true, Ordering::SeqCst);
    let client = PineconeClient::new(&config)?;

    let hits = client.search_records("what is ownership", 7, false).await?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "1");
    assert!((hits[0].score - 0.9).abs() < 1e-6);
    assert_eq!(hits[0].fields.url, "u1");

    let requests = mock.search_requests.lock().unwrap();
    assert_eq!(requests[0]["query"]["inputs"]["text"], "what is ownership");
    assert_eq!(requests[0]["query"]["top_k"], 7);
    assert!(requests[0].get("rerank").is_none());
    Ok(())
}

#[tokio::test]
async fn test_search_with_rerank() -> Result<()> {
    let (mock, config) = MockPinecone::start().await;
    mock.index_exists.store(true, Ordering::SeqCst);
    let client = PineconeClient::new(&config)?;

    client.search_records("borrow checker", 3, true).await?;

    let requests = mock.search_requests.lock().unwrap();
    let rerank = &requests[0]["rerank"];
    assert_eq!(rerank["model"], "cohere-rerank-3.5");
    assert_eq!(rerank["rank_fields"][0], "title");
    assert_eq!(rerank["top_n"], 3);
    Ok(())
}

#[tokio::test]
async fn test_search_error_status() -> Result<()> {
    let (mock, config) = MockPinecone::start().await;
    mock.index_exists.store(true, Ordering::SeqCst);
    mock.fail_search.store(true, Ordering::SeqCst);
    let client = PineconeClient::new(&config)?;

    let err = client.search_records("query", 3, false).await.unwrap_err();
    assert!(err.to_string().contains("503"));
    Ok(())
}
