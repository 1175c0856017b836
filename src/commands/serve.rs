//! HTTP API command.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use super::build_hybrid_search;
use crate::config::Config;
use crate::web::{AppState, WebServer};

/// Start the search API, with `host` / `port` overriding `[server]`.
pub async fn run(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let search = Arc::new(build_hybrid_search(&config).await?);
    let (semantic_weight, keyword_weight) = search.weights();
    info!(
        semantic_weight = semantic_weight,
        keyword_weight = keyword_weight,
        rerank = search.rerank(),
        "Search backends ready"
    );

    WebServer::new(AppState::new(search, config))
        .start(&host, port)
        .await
}
