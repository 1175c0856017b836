use anyhow::Result;

use crate::config::Config;
use crate::pipeline::Pipeline;

pub async fn run(
    mut config: Config,
    skip_crawl: bool,
    retries: Option<u32>,
    retry_delay_secs: Option<u64>,
) -> Result<()> {
    if let Some(retries) = retries {
        config.pipeline.retries = retries;
    }
    if let Some(delay) = retry_delay_secs {
        config.pipeline.retry_delay_secs = delay;
    }

    let report = Pipeline::new(config).run(skip_crawl).await?;
    println!(
        "Pipeline finished: {} pages, {} questions, {} answers, {} vectors",
        report.pages, report.questions, report.answers, report.vectors
    );
    Ok(())
}
