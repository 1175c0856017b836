pub mod cli;
pub mod commands;
pub mod config;
pub mod crawl;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod records;
pub mod search;
pub mod storage;
pub mod web;

pub use config::Config;
pub use search::{combine_results, CombinedResult, HybridSearch, KeywordHit, SemanticHit, UrlTemplate};
