use anyhow::Result;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Create tables and the full-text index.
pub async fn run(config: Config) -> Result<()> {
    Pipeline::new(config).create_db().await?;
    println!("Database schema is ready");
    Ok(())
}
