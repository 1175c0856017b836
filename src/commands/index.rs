use anyhow::Result;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Upsert crawled questions into the vector index, creating it first if needed.
pub async fn run(config: Config) -> Result<()> {
    let namespace = config.pinecone.namespace.clone();
    let upserted = Pipeline::new(config).upsert_vectors().await?;
    println!("Upserted {} records into namespace '{}'", upserted, namespace);
    Ok(())
}
