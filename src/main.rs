use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use qasearch::cli::{Cli, Commands};
use qasearch::config::Config;
use qasearch::logging::{init_early_logging, init_logging};
use qasearch::metrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = match &cli.config {
        Some(path) => Config::load_file(path)?,
        None => Config::load(&root)?,
    };

    // The guard MUST be held until program exit to ensure logs are flushed
    let _logging_guard = match init_logging(&config.logging, &root) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging unavailable: {:#}", e);
            init_early_logging();
            None
        }
    };

    config.apply_env();

    tracing::info!("qasearch starting up");
    tracing::debug!("Working directory: {}", root.display());

    metrics::register_metrics();

    match cli.command {
        Commands::Serve { host, port } => {
            qasearch::commands::serve::run(config, host, port).await?;
        }
        Commands::Search {
            query,
            top_k,
            rerank,
        } => {
            qasearch::commands::search::run(&config, &query, top_k, rerank).await?;
        }
        Commands::Crawl { max_pages } => {
            qasearch::commands::crawl::run(&config, max_pages).await?;
        }
        Commands::InitDb => {
            qasearch::commands::init_db::run(config).await?;
        }
        Commands::Load => {
            qasearch::commands::load::run(config).await?;
        }
        Commands::Index => {
            qasearch::commands::index::run(config).await?;
        }
        Commands::Pipeline {
            skip_crawl,
            retries,
            retry_delay_secs,
        } => {
            qasearch::commands::pipeline::run(config, skip_crawl, retries, retry_delay_secs).await?;
        }
    }

    Ok(())
}
