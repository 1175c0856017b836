//! Hybrid search combining semantic similarity and full-text keyword matching.
//!
//! Both backends are queried concurrently for `top_k` hits each and the two
//! lists are merged with [`WeightedFusion`]. The fused list is the union of
//! both, so it may hold up to `2 * top_k` results.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::fusion::WeightedFusion;
use super::traits::{KeywordSearch, SearchError, SemanticSearch};
use super::types::{CombinedResult, UrlTemplate};
use crate::config::SearchConfig;
use crate::metrics::{SEARCH_FAILURES, SEARCH_LATENCY, SEARCH_REQUESTS, SEARCH_RESULTS};

pub struct HybridSearch {
    keyword: Arc<dyn KeywordSearch>,
    semantic: Arc<dyn SemanticSearch>,
    fusion: WeightedFusion,
    template: UrlTemplate,
    rerank: bool,
}

impl HybridSearch {
    /// Create a hybrid search with default weights (0.7 semantic, 0.3 keyword).
    pub fn new(
        keyword: Arc<dyn KeywordSearch>,
        semantic: Arc<dyn SemanticSearch>,
        template: UrlTemplate,
    ) -> Self {
        Self {
            keyword,
            semantic,
            fusion: WeightedFusion::default(),
            template,
            rerank: false,
        }
    }

    /// Create a hybrid search using weights, url template and rerank flag from config.
    pub fn from_config(
        keyword: Arc<dyn KeywordSearch>,
        semantic: Arc<dyn SemanticSearch>,
        config: &SearchConfig,
    ) -> Self {
        Self::new(keyword, semantic, config.url_template.clone())
            .with_fusion(WeightedFusion::new(config.semantic_weight, config.keyword_weight))
            .with_rerank(config.rerank)
    }

    pub fn with_fusion(mut self, fusion: WeightedFusion) -> Self {
        self.fusion = fusion;
        self
    }

    pub fn with_rerank(mut self, rerank: bool) -> Self {
        self.rerank = rerank;
        self
    }

    /// Get the configured weights.
    pub fn weights(&self) -> (f64, f64) {
        self.fusion.weights()
    }

    pub fn rerank(&self) -> bool {
        self.rerank
    }

    /// Search with the configured rerank setting.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<CombinedResult>, SearchError> {
        self.search_with(query, top_k, self.rerank).await
    }

    /// Search both backends and fuse the hits.
    ///
    /// A failure in either backend fails the whole request.
    pub async fn search_with(
        &self,
        query: &str,
        top_k: usize,
        rerank: bool,
    ) -> Result<Vec<CombinedResult>, SearchError> {
        SEARCH_REQUESTS.inc();
        let start = Instant::now();

        let (semantic_hits, keyword_hits) = tokio::join!(
            self.semantic.search(query, top_k, rerank),
            self.keyword.search(query, top_k)
        );

        let semantic_hits = semantic_hits.map_err(|e| {
            warn!(backend = self.semantic.backend_name(), error = %format!("{:#}", e), "Semantic search failed");
            SearchError::Semantic(e)
        });
        let keyword_hits = keyword_hits.map_err(|e| {
            warn!(backend = self.keyword.backend_name(), error = %format!("{:#}", e), "Keyword search failed");
            SearchError::Keyword(e)
        });

        let (semantic_hits, keyword_hits) = match (semantic_hits, keyword_hits) {
            (Ok(s), Ok(k)) => (s, k),
            (Err(e), _) | (_, Err(e)) => {
                SEARCH_FAILURES.with_label_values(&[e.backend()]).inc();
                return Err(e);
            }
        };

        let fused = self.fusion.fuse(&semantic_hits, &keyword_hits, &self.template);

        let elapsed = start.elapsed();
        SEARCH_LATENCY.observe(elapsed.as_secs_f64());
        SEARCH_RESULTS.observe(fused.len() as f64);

        let (semantic_weight, keyword_weight) = self.fusion.weights();
        info!(
            search_type = "hybrid",
            query = query,
            semantic_hits = semantic_hits.len(),
            keyword_hits = keyword_hits.len(),
            results = fused.len(),
            semantic_weight = semantic_weight,
            keyword_weight = keyword_weight,
            elapsed_ms = elapsed.as_millis() as u64,
            "Hybrid search completed"
        );

        Ok(fused)
    }
}
