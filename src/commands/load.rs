use anyhow::Result;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Load questions, then answers, from the crawled JSON.
pub async fn run(config: Config) -> Result<()> {
    let pipeline = Pipeline::new(config);
    let questions = pipeline.load_questions().await?;
    let answers = pipeline.load_answers().await?;
    println!("Loaded {} questions and {} answers", questions, answers);
    Ok(())
}
