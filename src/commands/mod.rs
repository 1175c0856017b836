//! Subcommand implementations.

pub mod crawl;
pub mod index;
pub mod init_db;
pub mod load;
pub mod pipeline;
pub mod search;
pub mod serve;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::Config;
use crate::search::{HybridSearch, KeywordEngine, SemanticEngine};
use crate::storage::{PgStore, PineconeClient};

/// Connect both backends and wrap them in a hybrid search.
pub async fn build_hybrid_search(config: &Config) -> Result<HybridSearch> {
    config
        .search
        .url_template
        .validate()
        .context("Invalid [search] url_template")?;

    let store = Arc::new(PgStore::connect(&config.postgres).await?);
    let client = Arc::new(PineconeClient::new(&config.pinecone)?);

    Ok(HybridSearch::from_config(
        Arc::new(KeywordEngine::new(store)),
        Arc::new(SemanticEngine::new(client)),
        &config.search,
    ))
}
