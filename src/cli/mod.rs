use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qasearch")]
#[command(author, version, about = "Hybrid semantic and keyword search over interview questions")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file (default: ./qasearch.toml)
    #[arg(short, long, global = true, env = "QASEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP search API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one hybrid search and print the results
    Search {
        /// Search query
        query: String,

        /// Hits requested from each backend
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Rerank semantic hits on the provider side
        #[arg(long)]
        rerank: bool,
    },

    /// Fetch question pages into the JSON and HTML directories
    Crawl {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Create the PostgreSQL tables and indexes
    InitDb,

    /// Load crawled questions and answers into PostgreSQL
    Load,

    /// Create the vector index if needed and upsert crawled questions
    Index,

    /// Run the whole ingestion chain with retries
    Pipeline {
        /// Use JSON already on disk instead of crawling
        #[arg(long)]
        skip_crawl: bool,

        /// Retries per step after the first attempt
        #[arg(long)]
        retries: Option<u32>,

        /// Delay between attempts in seconds
        #[arg(long)]
        retry_delay_secs: Option<u64>,
    },
}
