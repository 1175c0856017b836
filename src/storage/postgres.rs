//! PostgreSQL sink and full-text keyword source.
//!
//! Connections come from a pool and every write runs in a transaction, so a
//! failed batch rolls back and the connection is returned on every path.

use anyhow::{bail, Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{debug, info};

use super::{batch_records, dedupe_last_by_key};
use crate::config::PostgresConfig;
use crate::metrics::ROWS_LOADED;
use crate::records::{AnswerRow, QuestionRow};
use crate::search::KeywordHit;

const INIT_SQL: &str = include_str!("sql/init.sql");

const KEYWORD_QUERY: &str = r#"
    SELECT id, title, ts_rank_cd(tsv, plainto_tsquery($1::regconfig, $2))::float8 AS rank
    FROM questions
    WHERE tsv @@ plainto_tsquery($1::regconfig, $2)
    ORDER BY rank DESC
    LIMIT $3
"#;

/// Pooled access to the `questions` / `answers` tables.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    text_search_config: String,
    insert_batch_size: usize,
}

impl PgStore {
    /// Connect a new pool using the configured parameters.
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(config.connect_options()?)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to PostgreSQL at {}:{}/{}",
                    config.host, config.port, config.database
                )
            })?;

        debug!("PostgreSQL pool established");
        Self::from_pool(pool, config)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool, config: &PostgresConfig) -> Result<Self> {
        validate_ts_config(&config.text_search_config)?;
        Ok(Self {
            pool,
            text_search_config: config.text_search_config.clone(),
            insert_batch_size: config.insert_batch_size,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init_schema(&self) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        for statement in schema_statements(&self.text_search_config) {
            debug!(statement = %statement, "Executing DDL");
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to execute DDL: {}", statement))?;
        }

        tx.commit().await.context("Failed to commit schema")?;
        info!("Database schema initialized");
        Ok(())
    }

    /// Insert or update question rows. Returns the number of rows written.
    pub async fn upsert_questions(&self, rows: &[QuestionRow]) -> Result<u64> {
        if rows.is_empty() {
            tracing::error!("No rows to insert into 'questions'");
            return Ok(0);
        }

        let rows = dedupe_last_by_key(rows, |q| q.id.clone());
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut written = 0;

        for batch in batch_records(&rows, self.insert_batch_size) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO questions (id, title, keywords, created_at) ");
            builder.push_values(batch, |mut row, q| {
                row.push_bind(q.id.clone())
                    .push_bind(q.title.clone())
                    .push_bind(q.keywords.clone())
                    .push_bind(q.created_at);
            });
            builder.push(
                " ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, \
                 keywords = EXCLUDED.keywords, created_at = EXCLUDED.created_at",
            );

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert {} rows into 'questions'", batch.len()))?;
            written += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit questions")?;
        ROWS_LOADED.with_label_values(&["questions"]).inc_by(written);
        debug!("Successfully inserted {} rows into 'questions'", written);
        Ok(written)
    }

    /// Insert or update answer rows. Returns the number of rows written.
    pub async fn upsert_answers(&self, rows: &[AnswerRow]) -> Result<u64> {
        if rows.is_empty() {
            tracing::error!("No rows to insert into 'answers'");
            return Ok(0);
        }

        let rows = dedupe_last_by_key(rows, |a| a.question_id.clone());
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut written = 0;

        for batch in batch_records(&rows, self.insert_batch_size) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO answers (question_id, body_md) ");
            builder.push_values(batch, |mut row, a| {
                row.push_bind(a.question_id.clone()).push_bind(a.body_md.clone());
            });
            builder.push(" ON CONFLICT (question_id) DO UPDATE SET body_md = EXCLUDED.body_md");

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert {} rows into 'answers'", batch.len()))?;
            written += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit answers")?;
        ROWS_LOADED.with_label_values(&["answers"]).inc_by(written);
        debug!("Successfully inserted {} rows into 'answers'", written);
        Ok(written)
    }

    /// Full-text search over question titles, best rank first.
    pub async fn keyword_search(&self, query: &str, top_k: usize) -> Result<Vec<KeywordHit>> {
        let rows: Vec<(String, String, f64)> = sqlx::query_as(KEYWORD_QUERY)
            .bind(&self.text_search_config)
            .bind(query)
            .bind(top_k as i64)
            .fetch_all(&self.pool)
            .await
            .with_context(|| "Failed to execute keyword query")?;

        Ok(rows
            .into_iter()
            .map(|(id, title, score)| KeywordHit { id, score, title })
            .collect())
    }
}

/// Text search configurations are spliced into DDL, so only plain identifiers pass.
fn validate_ts_config(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !valid {
        bail!("Invalid text search configuration name: {:?}", name);
    }
    Ok(())
}

fn schema_statements(ts_config: &str) -> Vec<String> {
    INIT_SQL
        .replace("{ts_config}", ts_config)
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
