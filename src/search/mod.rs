//! Hybrid question search.
//!
//! This module contains:
//! - `types` - Hit and result types shared by both backends
//! - `fusion` - Weighted-sum fusion of semantic and keyword hits
//! - `traits` - `KeywordSearch` / `SemanticSearch` backend contracts
//! - `keyword` - PostgreSQL full-text backend
//! - `semantic` - Pinecone backend
//! - `hybrid` - Concurrent lookup of both backends followed by fusion

pub mod fusion;
pub mod hybrid;
pub mod keyword;
pub mod semantic;
pub mod traits;
pub mod types;

pub use fusion::{combine_results, WeightedFusion, DEFAULT_KEYWORD_WEIGHT, DEFAULT_SEMANTIC_WEIGHT};
pub use hybrid::HybridSearch;
pub use keyword::KeywordEngine;
pub use semantic::SemanticEngine;
pub use traits::{KeywordSearch, SearchError, SemanticSearch};
pub use types::{CombinedResult, HitFields, KeywordHit, SemanticHit, TemplateError, UrlTemplate};
