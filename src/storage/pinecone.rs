//! Pinecone REST client for an integrated-embedding index.
//!
//! The index embeds one text field of each record server-side, so records are
//! upserted and searched as plain JSON without local embedding.

use anyhow::{bail, Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::batch_records;
use crate::config::PineconeConfig;
use crate::metrics::VECTOR_RECORDS_UPSERTED;
use crate::records::VectorRecord;
use crate::search::SemanticHit;

/// Fields returned with every search hit.
const HIT_FIELDS: [&str; 2] = ["title", "url"];

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<SemanticHit>,
}

/// Client for index management, record upsert and record search.
pub struct PineconeClient {
    http: Client,
    api_key: String,
    config: PineconeConfig,
    host: OnceCell<String>,
}

impl PineconeClient {
    pub fn new(config: &PineconeConfig) -> Result<Self> {
        let api_key = config
            .load_api_key()
            .context("Failed to load Pinecone API key")?;

        if config.index_name.is_empty() || config.namespace.is_empty() {
            bail!("Pinecone index name and namespace must be provided");
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key,
            config: config.clone(),
            host: OnceCell::new_with(config.index_host.as_deref().map(normalize_host)),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.config.api_version)
    }

    fn control_url(&self, path: &str) -> String {
        format!("{}{}", self.config.control_url.trim_end_matches('/'), path)
    }

    async fn describe_index(&self) -> Result<Option<IndexDescription>> {
        let url = self.control_url(&format!("/indexes/{}", self.config.index_name));
        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .with_context(|| format!("Failed to reach Pinecone control plane at {}", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = ensure_success(response, "describe index").await?;
        let description = response
            .json()
            .await
            .context("Failed to decode index description")?;
        Ok(Some(description))
    }

    pub async fn has_index(&self) -> Result<bool> {
        Ok(self.describe_index().await?.is_some())
    }

    /// Create the index for the hosted embedding model unless it already exists.
    ///
    /// Returns `true` when the index was created by this call.
    pub async fn create_index(&self) -> Result<bool> {
        if self.has_index().await? {
            debug!("Index `{}` already exists.", self.config.index_name);
            return Ok(false);
        }

        let body = json!({
            "name": self.config.index_name,
            "cloud": self.config.cloud,
            "region": self.config.region,
            "embed": {
                "model": self.config.embed_model,
                "field_map": { "text": self.config.embed_field },
            },
        });

        let response = self
            .authorized(self.http.post(self.control_url("/indexes/create-for-model")))
            .json(&body)
            .send()
            .await
            .context("Failed to send create index request")?;
        ensure_success(response, "create index").await?;

        debug!("Index `{}` created.", self.config.index_name);
        Ok(true)
    }

    /// Data-plane base URL, resolved once from the control plane.
    async fn index_host(&self) -> Result<&str> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let description = self.describe_index().await?.with_context(|| {
                    format!("Pinecone index `{}` does not exist", self.config.index_name)
                })?;
                Ok::<_, anyhow::Error>(normalize_host(&description.host))
            })
            .await?;
        Ok(host.as_str())
    }

    async fn records_url(&self, action: &str) -> Result<String> {
        let host = self.index_host().await?;
        Ok(format!(
            "{}/records/namespaces/{}/{}",
            host, self.config.namespace, action
        ))
    }

    /// Upsert records in batches. Returns the number of records sent.
    pub async fn upsert_records(&self, records: &[VectorRecord]) -> Result<usize> {
        let url = self.records_url("upsert").await?;
        let mut sent = 0;

        for (i, batch) in batch_records(records, self.config.upsert_batch_size).enumerate() {
            let body = to_ndjson(batch)?;
            let response = self
                .authorized(self.http.post(&url))
                .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
                .body(body)
                .send()
                .await
                .with_context(|| format!("Failed to send upsert batch {}", i + 1))?;
            ensure_success(response, "upsert records").await?;

            sent += batch.len();
            VECTOR_RECORDS_UPSERTED.inc_by(batch.len() as f64);
            debug!("Upserted batch {} with {} records.", i + 1, batch.len());
        }

        info!(
            records = sent,
            namespace = %self.config.namespace,
            "All data upserted into Pinecone successfully."
        );
        Ok(sent)
    }

    /// Search records by text, optionally reranking on the title field.
    pub async fn search_records(
        &self,
        query: &str,
        top_k: usize,
        rerank: bool,
    ) -> Result<Vec<SemanticHit>> {
        let url = self.records_url("search").await?;

        let mut body = json!({
            "query": {
                "inputs": { "text": query },
                "top_k": top_k,
            },
            "fields": HIT_FIELDS,
        });
        if rerank {
            body["rerank"] = json!({
                "model": self.config.rerank_model,
                "rank_fields": [self.config.embed_field],
                "top_n": top_k,
            });
        }

        let response = self
            .authorized(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .context("Failed to send search request")?;
        let response = ensure_success(response, "search records").await?;

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to decode search response")?;
        Ok(parsed.result.hits)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

fn to_ndjson(records: &[VectorRecord]) -> Result<String> {
    let mut body = String::new();
    for record in records {
        body.push_str(&serde_json::to_string(record).context("Failed to encode record")?);
        body.push('\n');
    }
    Ok(body)
}

async fn ensure_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    bail!("Pinecone {} failed with {}: {}", action, status, text)
}
