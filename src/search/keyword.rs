use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::traits::KeywordSearch;
use super::types::KeywordHit;
use crate::storage::PgStore;

/// Full-text search over question titles stored in PostgreSQL.
pub struct KeywordEngine {
    store: Arc<PgStore>,
}

impl KeywordEngine {
    pub fn new(store: Arc<PgStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PgStore> {
        &self.store
    }
}

#[async_trait]
impl KeywordSearch for KeywordEngine {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<KeywordHit>> {
        let start = Instant::now();
        let hits = self.store.keyword_search(query, top_k).await?;

        debug!(
            search_type = "keyword",
            query = query,
            results = hits.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Keyword search completed"
        );
        Ok(hits)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
