use std::path::Path;

use anyhow::Result;
use colored::*;

pub async fn run(
    config: Option<&Path>,
    keywords: &[String],
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let engine = super::engine(config)?;
    let results = engine.search(keywords, limit).await?;
    let query = keywords.join(", ");

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        results.len(),
        query.cyan()
    );
    println!();
    super::print_scored(&results, false);

    Ok(())
}
