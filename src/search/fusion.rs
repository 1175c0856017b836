//! Weighted-sum fusion of semantic and keyword hit lists.
//!
//! Scores are combined as given, without per-source normalization, so the
//! weights also absorb the difference between the two backends' score scales.

use std::collections::HashMap;

use super::types::{CombinedResult, KeywordHit, SemanticHit, UrlTemplate};

/// Default weight for semantic scores.
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.7;

/// Default weight for keyword scores.
pub const DEFAULT_KEYWORD_WEIGHT: f64 = 0.3;

/// Per-id merge state built while walking both hit lists.
#[derive(Debug, Clone, PartialEq)]
struct Accumulator {
    id: String,
    semantic_score: f64,
    keyword_score: f64,
    title: String,
    url: String,
}

/// Linear combination of semantic and keyword scores, keyed by document id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedFusion {
    semantic_weight: f64,
    keyword_weight: f64,
}

impl WeightedFusion {
    pub fn new(semantic_weight: f64, keyword_weight: f64) -> Self {
        Self {
            semantic_weight,
            keyword_weight,
        }
    }

    pub fn weights(&self) -> (f64, f64) {
        (self.semantic_weight, self.keyword_weight)
    }

    /// Merge both lists into one ranked list.
    ///
    /// Every id from either input appears exactly once. Ids known from the
    /// semantic list keep its title and url; ids only seen by keyword search
    /// get their url from `template`. Equal scores keep first-seen order.
    pub fn fuse(
        &self,
        semantic: &[SemanticHit],
        keyword: &[KeywordHit],
        template: &UrlTemplate,
    ) -> Vec<CombinedResult> {
        let mut slots: HashMap<&str, usize> = HashMap::with_capacity(semantic.len() + keyword.len());
        let mut merged: Vec<Accumulator> = Vec::with_capacity(semantic.len() + keyword.len());

        for hit in semantic {
            let entry = Accumulator {
                id: hit.id.clone(),
                semantic_score: hit.score,
                keyword_score: 0.0,
                title: hit.fields.title.clone(),
                url: hit.fields.url.clone(),
            };
            match slots.get(hit.id.as_str()) {
                Some(&slot) => merged[slot] = entry,
                None => {
                    slots.insert(hit.id.as_str(), merged.len());
                    merged.push(entry);
                }
            }
        }

        for hit in keyword {
            match slots.get(hit.id.as_str()) {
                Some(&slot) => merged[slot].keyword_score = hit.score,
                None => {
                    slots.insert(hit.id.as_str(), merged.len());
                    merged.push(Accumulator {
                        id: hit.id.clone(),
                        semantic_score: 0.0,
                        keyword_score: hit.score,
                        title: hit.title.clone(),
                        url: template.render(&hit.id),
                    });
                }
            }
        }

        self.rank(merged)
    }

    fn rank(&self, merged: Vec<Accumulator>) -> Vec<CombinedResult> {
        let mut results: Vec<CombinedResult> = merged
            .into_iter()
            .map(|acc| CombinedResult {
                score: self.semantic_weight * acc.semantic_score
                    + self.keyword_weight * acc.keyword_score,
                id: acc.id,
                title: acc.title,
                url: acc.url,
            })
            .collect();

        // sort_by is stable, so ties stay in first-seen order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}

impl Default for WeightedFusion {
    fn default() -> Self {
        Self::new(DEFAULT_SEMANTIC_WEIGHT, DEFAULT_KEYWORD_WEIGHT)
    }
}

/// Fuse two hit lists with explicit weights.
pub fn combine_results(
    semantic: &[SemanticHit],
    keyword: &[KeywordHit],
    semantic_weight: f64,
    keyword_weight: f64,
    template: &UrlTemplate,
) -> Vec<CombinedResult> {
    WeightedFusion::new(semantic_weight, keyword_weight).fuse(semantic, keyword, template)
}
