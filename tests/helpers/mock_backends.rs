//! In-memory search backends.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use qasearch::search::{KeywordHit, KeywordSearch, SemanticHit, SemanticSearch};

/// Keyword backend returning a fixed hit list, or failing on every call.
pub struct MockKeyword {
    hits: Vec<KeywordHit>,
    fail: bool,
}

impl MockKeyword {
    pub fn new(hits: Vec<KeywordHit>) -> Self {
        Self { hits, fail: false }
    }

    pub fn failing() -> Self {
        Self { hits: Vec::new(), fail: true }
    }
}

#[async_trait]
impl KeywordSearch for MockKeyword {
    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<KeywordHit>> {
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

/// Semantic backend returning a fixed hit list, or failing on every call.
pub struct MockSemantic {
    hits: Vec<SemanticHit>,
    fail: bool,
}

impl MockSemantic {
    pub fn new(hits: Vec<SemanticHit>) -> Self {
        Self { hits, fail: false }
    }

    pub fn failing() -> Self {
        Self { hits: Vec::new(), fail: true }
    }
}

#[async_trait]
impl SemanticSearch for MockSemantic {
    async fn search(&self, _query: &str, top_k: usize, _rerank: bool) -> Result<Vec<SemanticHit>> {
        if self.fail {
            return Err(anyhow!("upstream timeout"));
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
