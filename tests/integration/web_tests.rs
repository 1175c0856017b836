use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

use crate::helpers::mock_backends::{MockKeyword, MockSemantic};
use qasearch::config::Config;
use qasearch::search::{HybridSearch, KeywordHit, SemanticHit, UrlTemplate};
use qasearch::web::{routes::create_router, AppState};

fn router_with(keyword: MockKeyword, semantic: MockSemantic) -> Router {
    let search = HybridSearch::new(
        Arc::new(keyword),
        Arc::new(semantic),
        UrlTemplate::new("https://example.com/q/{id}"),
    );
    create_router(AppState::new(Arc::new(search), Config::default()))
}

fn healthy_router() -> Router {
    router_with(
        MockKeyword::new(vec![
            KeywordHit::new("1", 0.5, "T1"),
            KeywordHit::new("2", 0.8, "T2"),
        ]),
        MockSemantic::new(vec![SemanticHit::new("1", 0.9, "T1", "u1")]),
    )
}

async fn get(router: Router, uri: &str) -> Result<(StatusCode, Vec<u8>)> {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, body.to_vec()))
}

async fn get_json(router: Router, uri: &str) -> Result<(StatusCode, Value)> {
    let (status, body) = get(router, uri).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

#[tokio::test]
async fn test_root() -> Result<()> {
    let (status, body) = get_json(healthy_router(), "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello World");
    Ok(())
}

#[tokio::test]
async fn test_search_returns_fused_results() -> Result<()> {
    let (status, body) = get_json(healthy_router(), "/search?query=git%20rebase&top_k=5").await?;

    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().expect("array body");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "1");
    assert!((results[0]["score"].as_f64().unwrap() - 0.78).abs() < 1e-5);
    assert_eq!(results[0]["url"], "u1");
    assert_eq!(results[1]["id"], "2");
    assert_eq!(results[1]["url"], "https://example.com/q/2");
    Ok(())
}

#[tokio::test]
async fn test_search_default_top_k() -> Result<()> {
    let hits: Vec<KeywordHit> = (0..30)
        .map(|i| KeywordHit::new(i.to_string(), 1.0, format!("T{}", i)))
        .collect();
    let router = router_with(MockKeyword::new(hits), MockSemantic::new(vec![]));

    let (status, body) = get_json(router, "/search?query=closures").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_search_rejects_short_query() -> Result<()> {
    let (status, body) = get_json(healthy_router(), "/search?query=ab").await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("at least 3"));
    Ok(())
}

#[tokio::test]
async fn test_search_rejects_missing_query() -> Result<()> {
    let (status, body) = get_json(healthy_router(), "/search").await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_search_rejects_top_k_out_of_range() -> Result<()> {
    for uri in [
        "/search?query=rust&top_k=0",
        "/search?query=rust&top_k=101",
        "/search?query=rust&top_k=many",
    ] {
        let (status, body) = get_json(healthy_router(), uri).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert!(body["detail"].is_string(), "{}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn test_keyword_backend_failure_is_500() -> Result<()> {
    let router = router_with(
        MockKeyword::failing(),
        MockSemantic::new(vec![SemanticHit::new("1", 0.9, "T1", "u1")]),
    );
    let (status, body) = get_json(router, "/search?query=rust").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Search failed: keyword search backend unavailable");
    Ok(())
}

#[tokio::test]
async fn test_semantic_backend_failure_is_500() -> Result<()> {
    let router = router_with(MockKeyword::new(vec![]), MockSemantic::failing());
    let (status, body) = get_json(router, "/search?query=rust").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert_eq!(detail, "Search failed: semantic search backend unavailable");
    assert!(!detail.contains("timeout"), "Upstream detail must not leak");
    Ok(())
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let (status, body) = get_json(healthy_router(), "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    Ok(())
}

#[tokio::test]
async fn test_metrics_exposes_search_counter() -> Result<()> {
    qasearch::metrics::register_metrics();

    let router = healthy_router();
    get(router.clone(), "/search?query=rust").await?;

    let (status, body) = get(router, "/metrics").await?;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body)?;
    assert!(text.contains("qasearch_search_requests_total"));
    Ok(())
}
