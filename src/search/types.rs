//! Hit and result types exchanged between the search backends and fusion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display fields stored alongside each record in the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitFields {
    pub title: String,
    pub url: String,
}

/// One hit from the semantic (vector) backend, in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: f64,
    pub fields: HitFields,
}

impl SemanticHit {
    pub fn new(id: impl Into<String>, score: f64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score,
            fields: HitFields {
                title: title.into(),
                url: url.into(),
            },
        }
    }
}

/// One hit from the keyword (full-text) backend. Carries no URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub id: String,
    pub score: f64,
    pub title: String,
}

impl KeywordHit {
    pub fn new(id: impl Into<String>, score: f64, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score,
            title: title.into(),
        }
    }
}

/// A fused search result as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub id: String,
    pub score: f64,
    pub title: String,
    pub url: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("URL template '{0}' has no '{{id}}' or '{{}}' placeholder")]
    MissingPlaceholder(String),
}

/// Format string that turns a question id into its public URL.
///
/// The placeholder is `{id}`; a bare `{}` is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.0.contains("{id}") || self.0.contains("{}") {
            Ok(())
        } else {
            Err(TemplateError::MissingPlaceholder(self.0.clone()))
        }
    }

    pub fn render(&self, id: &str) -> String {
        if self.0.contains("{id}") {
            self.0.replace("{id}", id)
        } else {
            self.0.replacen("{}", id, 1)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
