//! Question/answer records as delivered by the site's paginated JSON API,
//! and their projections into relational rows and vector-index records.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::search::UrlTemplate;

/// One page of the public questions API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionPage {
    #[serde(default)]
    pub data: Vec<QuestionRecord>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
}

/// A single question with its short answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub short_answer: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Row for the `questions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub id: String,
    pub title: String,
    pub keywords: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Row for the `answers` table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRow {
    pub question_id: String,
    pub body_md: Option<String>,
}

/// Record for the vector index; `title` is the embedded field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub url: String,
}

fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QuestionRecord {
    pub fn to_question_row(&self) -> QuestionRow {
        QuestionRow {
            id: self.id.clone(),
            title: self.title.clone(),
            keywords: self.keywords.clone(),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }

    pub fn to_answer_row(&self) -> AnswerRow {
        AnswerRow {
            question_id: self.id.clone(),
            body_md: self.short_answer.clone(),
        }
    }

    pub fn to_vector_record(&self, template: &UrlTemplate) -> VectorRecord {
        VectorRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            tags: self.keywords.clone(),
            url: template.render(&self.id),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!(value = raw, error = %e, "Unparseable createdAt, storing NULL");
            None
        }
    }
}

/// All `*.json` files under `dir`, recursively, in crawl order.
///
/// `page_N.json` files sort by `N`; files without a page number go last.
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("JSON directory {} does not exist", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }
    files.sort_by_cached_key(|path| (page_number(path).unwrap_or(u64::MAX), path.clone()));
    Ok(files)
}

/// Numeric suffix of a `page_N.json` style file name.
fn page_number(path: &Path) -> Option<u64> {
    path.file_stem()?.to_str()?.rsplit('_').next()?.parse().ok()
}

/// Read and decode one saved page.
pub fn read_page(path: &Path) -> Result<QuestionPage> {
    debug!("Reading {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to decode JSON from {}", path.display()))
}

/// Read every question from every page under `dir`.
///
/// Fails when the directory holds no JSON files or any file cannot be decoded.
pub fn load_questions(dir: &Path) -> Result<Vec<QuestionRecord>> {
    let files = json_files(dir)?;
    if files.is_empty() {
        bail!("No JSON files found in {}", dir.display());
    }

    let mut records = Vec::new();
    for path in &files {
        let page = read_page(path)?;
        records.extend(page.data);
    }

    debug!(files = files.len(), records = records.len(), "Loaded question records");
    Ok(records)
}
