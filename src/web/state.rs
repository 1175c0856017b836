//! Shared state for request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::search::HybridSearch;

/// Cloned into every handler; the search engine itself is shared.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<HybridSearch>,
    pub config: Config,
}

impl AppState {
    pub fn new(search: Arc<HybridSearch>, config: Config) -> Self {
        Self { search, config }
    }
}
