//! Ingestion chain: schema, crawl, relational load, vector upsert.
//!
//! Steps run strictly in order. Each one is retried a fixed number of times
//! with a fixed delay; a step that still fails aborts the chain.

use anyhow::{Context, Result};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::{Config, PipelineConfig};
use crate::crawl::Crawler;
use crate::records::{load_questions, QuestionRecord};
use crate::storage::{PgStore, PineconeClient};

/// Fixed-count, fixed-delay retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.retries, Duration::from_secs(config.retry_delay_secs))
    }

    /// Run `op` until it succeeds or `retries + 1` attempts have failed.
    pub async fn run<T, F, Fut>(&self, step: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.retries + 1;
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    warn!(
                        step = step,
                        attempt = attempt,
                        max_attempts = attempts,
                        error = %format!("{:#}", e),
                        "Step failed, retrying in {:?}",
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e.context(format!(
                        "Step `{}` failed after {} attempts",
                        step, attempts
                    )))
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateDb,
    Crawl,
    LoadQuestions,
    LoadAnswers,
    UpsertVectors,
}

impl Step {
    /// Steps in execution order.
    pub const ALL: [Step; 5] = [
        Step::CreateDb,
        Step::Crawl,
        Step::LoadQuestions,
        Step::LoadAnswers,
        Step::UpsertVectors,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::CreateDb => "create_db",
            Step::Crawl => "crawl",
            Step::LoadQuestions => "load_questions",
            Step::LoadAnswers => "load_answers",
            Step::UpsertVectors => "upsert_vectors",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Steps to run, in order, for a given crawl setting.
pub fn plan(skip_crawl: bool) -> Vec<Step> {
    Step::ALL
        .into_iter()
        .filter(|step| !(skip_crawl && *step == Step::Crawl))
        .collect()
}

/// Counts reported by a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub pages: u32,
    pub questions: u64,
    pub answers: u64,
    pub vectors: usize,
}

pub struct Pipeline {
    config: Config,
    retry: RetryPolicy,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let retry = RetryPolicy::from_config(&config.pipeline);
        Self { config, retry }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn create_db(&self) -> Result<()> {
        let store = PgStore::connect(&self.config.postgres).await?;
        store.init_schema().await
    }

    pub async fn crawl(&self) -> Result<u32> {
        let summary = Crawler::new(&self.config.crawl)?.run().await?;
        Ok(summary.pages)
    }

    fn records(&self) -> Result<Vec<QuestionRecord>> {
        load_questions(&self.config.crawl.json_dir)
            .with_context(|| "Failed to read crawled questions")
    }

    pub async fn load_questions(&self) -> Result<u64> {
        let rows: Vec<_> = self.records()?.iter().map(QuestionRecord::to_question_row).collect();
        let store = PgStore::connect(&self.config.postgres).await?;
        store.upsert_questions(&rows).await
    }

    pub async fn load_answers(&self) -> Result<u64> {
        let rows: Vec<_> = self.records()?.iter().map(QuestionRecord::to_answer_row).collect();
        let store = PgStore::connect(&self.config.postgres).await?;
        store.upsert_answers(&rows).await
    }

    pub async fn upsert_vectors(&self) -> Result<usize> {
        let template = &self.config.search.url_template;
        template.validate()?;
        let records: Vec<_> = self
            .records()?
            .iter()
            .map(|r| r.to_vector_record(template))
            .collect();

        let client = PineconeClient::new(&self.config.pinecone)?;
        client.create_index().await?;
        client.upsert_records(&records).await
    }

    /// Run every planned step in order.
    pub async fn run(&self, skip_crawl: bool) -> Result<PipelineReport> {
        let start = Instant::now();
        let mut report = PipelineReport::default();

        for step in plan(skip_crawl) {
            info!(step = step.name(), "Starting step");
            let retry = &self.retry;
            match step {
                Step::CreateDb => retry.run(step.name(), || self.create_db()).await?,
                Step::Crawl => report.pages = retry.run(step.name(), || self.crawl()).await?,
                Step::LoadQuestions => {
                    report.questions = retry.run(step.name(), || self.load_questions()).await?
                }
                Step::LoadAnswers => {
                    report.answers = retry.run(step.name(), || self.load_answers()).await?
                }
                Step::UpsertVectors => {
                    report.vectors = retry.run(step.name(), || self.upsert_vectors()).await?
                }
            }
        }

        info!(
            pages = report.pages,
            questions = report.questions,
            answers = report.answers,
            vectors = report.vectors,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline completed"
        );
        Ok(report)
    }
}
