//! Similar command - articles closest to an indexed seed article

use std::path::Path;

use anyhow::Result;
use colored::*;

use seanews_mcp::SimilarRequest;

pub async fn run(config: Option<&Path>, request: SimilarRequest, json: bool) -> Result<()> {
    let engine = super::engine(config)?;
    let results = engine.similar(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let scope = match &request.filter_value {
        Some(value) => format!("{} = {}", request.filter, value),
        None => format!("same {} as seed", request.filter),
    };

    if results.is_empty() {
        println!(
            "{} No similar articles for {} ({})",
            "→".dimmed(),
            request.seed_url.cyan(),
            scope
        );
        return Ok(());
    }

    println!(
        "{} {} similar articles for {} ({})",
        "→".dimmed(),
        results.len(),
        request.seed_url.cyan(),
        scope
    );
    println!();
    super::print_scored(&results, true);

    Ok(())
}
