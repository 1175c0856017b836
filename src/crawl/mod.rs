//! Paginated fetch of the public questions API.
//!
//! Each page is saved twice: the JSON body as `page_N.json` for loading, and a
//! readable `page_N.html` listing every question with its short answer.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::records::QuestionPage;

/// Outcome of a crawl run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: u32,
    pub questions: usize,
}

pub struct Crawler {
    http: Client,
    config: CrawlConfig,
    show_progress: bool,
}

impl Crawler {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        if !config.api_url_template.contains("{page}") {
            bail!(
                "Crawl URL template must contain a {{page}} placeholder: {}",
                config.api_url_template
            );
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            config: config.clone(),
            show_progress: true,
        })
    }

    /// Enable or disable the terminal progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn page_url(&self, page: u32) -> String {
        self.config.api_url_template.replace("{page}", &page.to_string())
    }

    /// Fetch one page, returning the raw JSON document and its decoded form.
    pub async fn fetch_page(&self, page: u32) -> Result<(serde_json::Value, QuestionPage)> {
        let url = self.page_url(page);
        debug!("Load page {}: {}", page, url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Request for page {} failed with {}", page, status);
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("Failed to decode page {} as JSON", page))?;
        let decoded = serde_json::from_value(raw.clone())
            .with_context(|| format!("Unexpected page layout on page {}", page))?;

        Ok((raw, decoded))
    }

    /// Fetch pages until the API runs out of questions or `max_pages` is hit.
    pub async fn run(&self) -> Result<CrawlSummary> {
        let json_dir = &self.config.json_dir;
        let raw_dir = &self.config.raw_dir;
        fs::create_dir_all(json_dir)
            .with_context(|| format!("Failed to create {}", json_dir.display()))?;
        fs::create_dir_all(raw_dir)
            .with_context(|| format!("Failed to create {}", raw_dir.display()))?;

        let progress = self.progress_bar();
        let mut summary = CrawlSummary::default();

        for page in 1..=self.config.max_pages {
            let (raw, decoded) = self.fetch_page(page).await?;

            if decoded.data.is_empty() {
                info!("Page {} has no questions, crawl finished.", page);
                break;
            }

            let json_path = save_json(json_dir, page, &raw)?;
            let html_path = page_path(raw_dir, page, "html");
            fs::write(&html_path, render_html(&decoded))
                .with_context(|| format!("Failed to write {}", html_path.display()))?;
            debug!("Saved: {} and {}", json_path.display(), html_path.display());

            summary.pages += 1;
            summary.questions += decoded.data.len();

            if let Some(last) = last_page(&decoded) {
                progress.set_length(last.min(self.config.max_pages) as u64);
            }
            progress.set_position(page as u64);
            progress.set_message(format!("{} questions", summary.questions));

            if last_page(&decoded).is_some_and(|last| page >= last) {
                info!("Reached last page {}, crawl finished.", page);
                break;
            }
            if page == self.config.max_pages {
                warn!("Stopped at max_pages = {}", self.config.max_pages);
            }
        }

        progress.finish_with_message(format!("{} questions", summary.questions));
        info!(
            pages = summary.pages,
            questions = summary.questions,
            json_dir = %json_dir.display(),
            "Crawl completed"
        );
        Ok(summary)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(self.config.max_pages as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] Crawling: [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

/// Last page number implied by `total` and `limit`, when the API reports both.
fn last_page(page: &QuestionPage) -> Option<u32> {
    match (page.total, page.limit) {
        (Some(total), Some(limit)) if limit > 0 => Some(total.div_ceil(limit).max(1) as u32),
        _ => None,
    }
}

fn page_path(dir: &Path, page: u32, ext: &str) -> PathBuf {
    dir.join(format!("page_{}.{}", page, ext))
}

fn save_json(dir: &Path, page: u32, raw: &serde_json::Value) -> Result<PathBuf> {
    let path = page_path(dir, page, "json");
    let body = serde_json::to_string_pretty(raw).context("Failed to encode page")?;
    fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Render a page as numbered question / answer blocks.
pub fn render_html(page: &QuestionPage) -> String {
    let mut out = String::new();
    for (i, record) in page.data.iter().enumerate() {
        out.push_str(&format!("Вопрос {}<br>", i + 1));
        out.push_str(&escape_html(&record.title));
        out.push_str("<br>Ответ<br>");
        out.push_str(&escape_html(record.short_answer.as_deref().unwrap_or_default()));
        out.push_str("<br><br>");
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
