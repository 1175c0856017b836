use anyhow::Result;

use super::build_hybrid_search;
use crate::config::Config;
use crate::search::CombinedResult;

/// Run one search and print the fused results.
pub async fn run(config: &Config, query: &str, top_k: Option<usize>, rerank: bool) -> Result<()> {
    let top_k = top_k.unwrap_or(config.search.default_top_k);
    let search = build_hybrid_search(config).await?;

    let results = search
        .search_with(query, top_k, rerank || config.search.rerank)
        .await?;

    if results.is_empty() {
        println!("No results found for: {}", query);
        println!("\nMake sure the data is loaded with 'qasearch pipeline'");
        return Ok(());
    }

    println!("Found {} results for: \"{}\"\n", results.len(), query);
    print!("{}", format_results(&results));
    Ok(())
}

fn format_results(results: &[CombinedResult]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} (score: {:.4})\n   {}\n",
            i + 1,
            result.title,
            result.score,
            result.url
        ));
    }
    out
}
