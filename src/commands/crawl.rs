use anyhow::Result;

use crate::config::Config;
use crate::crawl::Crawler;

pub async fn run(config: &Config, max_pages: Option<u32>) -> Result<()> {
    let mut crawl_config = config.crawl.clone();
    if let Some(max_pages) = max_pages {
        crawl_config.max_pages = max_pages;
    }

    let summary = Crawler::new(&crawl_config)?.run().await?;
    println!(
        "Saved {} pages ({} questions) to {}",
        summary.pages,
        summary.questions,
        crawl_config.json_dir.display()
    );
    Ok(())
}
