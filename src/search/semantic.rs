use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::traits::SemanticSearch;
use super::types::SemanticHit;
use crate::storage::PineconeClient;

/// Text search against the integrated-embedding vector index.
pub struct SemanticEngine {
    client: Arc<PineconeClient>,
}

impl SemanticEngine {
    pub fn new(client: Arc<PineconeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SemanticSearch for SemanticEngine {
    async fn search(&self, query: &str, top_k: usize, rerank: bool) -> Result<Vec<SemanticHit>> {
        let start = Instant::now();
        let hits = self.client.search_records(query, top_k, rerank).await?;

        debug!(
            search_type = "semantic",
            query = query,
            rerank = rerank,
            results = hits.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Semantic search completed"
        );
        Ok(hits)
    }

    fn backend_name(&self) -> &'static str {
        "pinecone"
    }
}
