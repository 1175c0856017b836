use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::search::UrlTemplate;

const CONFIG_FILE: &str = "qasearch.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub postgres: PostgresConfig,

    #[serde(default)]
    pub pinecone: PineconeConfig,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to a rolling file
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also write logs to stderr
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// File log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory (relative paths resolve against the working directory)
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Log file name prefix
    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,

    /// Rotation: minutely, hourly, daily, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stderr: true,
            level: default_log_level(),
            directory: default_log_directory(),
            file_prefix: default_log_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "qasearch.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_http_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8000
}

/// Hybrid search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Weight applied to semantic scores
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,

    /// Weight applied to keyword scores
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    /// Default number of hits requested from each backend
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Rerank semantic hits with the provider's reranker
    #[serde(default)]
    pub rerank: bool,

    /// Template used to build a question URL from its id
    #[serde(default = "default_url_template")]
    pub url_template: UrlTemplate,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            semantic_weight: default_semantic_weight(),
            keyword_weight: default_keyword_weight(),
            default_top_k: default_top_k(),
            rerank: false,
            url_template: default_url_template(),
        }
    }
}

fn default_semantic_weight() -> f64 {
    0.7
}

fn default_keyword_weight() -> f64 {
    0.3
}

fn default_top_k() -> usize {
    10
}

fn default_url_template() -> UrlTemplate {
    UrlTemplate::new("https://yeahub.ru/questions/{id}")
}

/// PostgreSQL connection and loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Full connection URL; takes precedence over the individual fields
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_pg_host")]
    pub host: String,

    #[serde(default = "default_pg_port")]
    pub port: u16,

    #[serde(default = "default_pg_database")]
    pub database: String,

    #[serde(default = "default_pg_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Text search configuration used for the full-text index
    #[serde(default = "default_text_search_config")]
    pub text_search_config: String,

    /// Rows per INSERT statement
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_pg_host(),
            port: default_pg_port(),
            database: default_pg_database(),
            user: default_pg_user(),
            password: String::new(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            text_search_config: default_text_search_config(),
            insert_batch_size: default_insert_batch_size(),
        }
    }
}

fn default_pg_host() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_database() -> String {
    "qasearch".to_string()
}

fn default_pg_user() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_text_search_config() -> String {
    "russian".to_string()
}

fn default_insert_batch_size() -> usize {
    500
}

impl PostgresConfig {
    /// Connection options from `url` when set, otherwise from the individual fields.
    ///
    /// Parts are passed unencoded, so credentials may contain URL-reserved characters.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).context("Invalid PostgreSQL connection URL");
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        Ok(options)
    }
}

/// Pinecone integrated-embedding index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    /// API key, or `${VAR}` to read it from the environment
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_index_name")]
    pub index_name: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Control plane base URL
    #[serde(default = "default_control_url")]
    pub control_url: String,

    /// Data plane host; resolved from the control plane when unset
    #[serde(default)]
    pub index_host: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_cloud")]
    pub cloud: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Hosted embedding model
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    /// Record field that gets embedded
    #[serde(default = "default_embed_field")]
    pub embed_field: String,

    #[serde(default = "default_rerank_model")]
    pub rerank_model: String,

    /// Records per upsert request (the service caps this at 96)
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_name: default_index_name(),
            namespace: default_namespace(),
            control_url: default_control_url(),
            index_host: None,
            api_version: default_api_version(),
            cloud: default_cloud(),
            region: default_region(),
            embed_model: default_embed_model(),
            embed_field: default_embed_field(),
            rerank_model: default_rerank_model(),
            upsert_batch_size: default_upsert_batch_size(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_index_name() -> String {
    "questions".to_string()
}

fn default_namespace() -> String {
    "yeahub".to_string()
}

fn default_control_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_api_version() -> String {
    "2025-01".to_string()
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_embed_model() -> String {
    "llama-text-embed-v2".to_string()
}

fn default_embed_field() -> String {
    "title".to_string()
}

fn default_rerank_model() -> String {
    "cohere-rerank-3.5".to_string()
}

fn default_upsert_batch_size() -> usize {
    50
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl PineconeConfig {
    /// Resolve the API key from explicit config, a `${VAR}` reference, or `PINECONE_API_KEY`.
    pub fn load_api_key(&self) -> Result<String> {
        if !self.api_key.is_empty() && !self.api_key.starts_with("${") {
            return Ok(self.api_key.clone());
        }

        if self.api_key.starts_with("${") && self.api_key.ends_with('}') {
            let var_name = &self.api_key[2..self.api_key.len() - 1];
            return std::env::var(var_name)
                .with_context(|| format!("Environment variable {} not set", var_name));
        }

        std::env::var("PINECONE_API_KEY")
            .context("No API key configured and PINECONE_API_KEY environment variable not set")
    }
}

/// Crawler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Paginated JSON endpoint; `{page}` is replaced with the 1-based page number
    #[serde(default = "default_api_url_template")]
    pub api_url_template: String,

    /// Directory for raw JSON pages
    #[serde(default = "default_json_dir")]
    pub json_dir: PathBuf,

    /// Directory for rendered HTML pages
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Hard stop after this many pages
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            api_url_template: default_api_url_template(),
            json_dir: default_json_dir(),
            raw_dir: default_raw_dir(),
            max_pages: default_max_pages(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_url_template() -> String {
    "https://api.yeahub.ru/questions/public-questions?page={page}&limit=10".to_string()
}

fn default_json_dir() -> PathBuf {
    PathBuf::from("data/json")
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_max_pages() -> u32 {
    500
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Retries per step after the first attempt
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed delay between attempts in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    15 * 60
}

impl Config {
    /// Load configuration from `qasearch.toml` in `root`, falling back to defaults.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_file(&Self::config_path(root))
    }

    /// Load configuration from an explicit file path.
    pub fn load_file(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration as `qasearch.toml` in `root`
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_path = Self::config_path(root);

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Apply overrides from process environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let pg = &mut self.postgres;
        if let Some(url) = lookup("DATABASE_URL") {
            pg.url = Some(url);
        }
        if let Some(db) = lookup("POSTGRES_DB") {
            pg.database = db;
        }
        if let Some(user) = lookup("POSTGRES_USER") {
            pg.user = user;
        }
        if let Some(password) = lookup("POSTGRES_PASSWORD") {
            pg.password = password;
        }
        if let Some(host) = lookup("POSTGRES_HOST") {
            pg.host = host;
        }
        if let Some(port) = lookup("POSTGRES_PORT") {
            match port.parse() {
                Ok(port) => pg.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid POSTGRES_PORT"),
            }
        }

        let pc = &mut self.pinecone;
        if let Some(key) = lookup("PINECONE_API_KEY") {
            pc.api_key = key;
        }
        if let Some(index) = lookup("PINECONE_INDEX_NAME") {
            pc.index_name = index;
        }
        if let Some(namespace) = lookup("PINECONE_NAMESPACE") {
            pc.namespace = namespace;
        }
        if let Some(host) = lookup("PINECONE_INDEX_HOST") {
            pc.index_host = Some(host);
        }
    }
}
