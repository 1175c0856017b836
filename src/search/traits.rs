//! Lookup contracts for the two search backends.
//!
//! The hybrid search only depends on these traits, so either backend can be
//! swapped for an in-memory implementation in tests.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use super::types::{KeywordHit, SemanticHit};

/// Lexical full-text search.
#[async_trait]
pub trait KeywordSearch: Send + Sync {
    /// Return at most `top_k` hits ordered by text relevance.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<KeywordHit>>;

    /// Backend identifier for logs.
    fn backend_name(&self) -> &'static str;
}

/// Nearest-neighbour search over embedded records.
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Return at most `top_k` hits ordered by similarity, optionally reranked.
    async fn search(&self, query: &str, top_k: usize, rerank: bool) -> Result<Vec<SemanticHit>>;

    /// Backend identifier for logs.
    fn backend_name(&self) -> &'static str;
}

/// Failure of one of the upstream lookups.
///
/// The display text is safe to hand to API clients; the source chain is not.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("keyword search backend unavailable")]
    Keyword(#[source] anyhow::Error),

    #[error("semantic search backend unavailable")]
    Semantic(#[source] anyhow::Error),
}

impl SearchError {
    /// Label of the failing backend, used for metrics.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Keyword(_) => "keyword",
            Self::Semantic(_) => "semantic",
        }
    }
}
