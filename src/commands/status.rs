use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::*;
use serde::Serialize;

use seanews_mcp::config::StoreBackend;
use seanews_mcp::store::StoreStats;

#[derive(Serialize)]
struct IndexStatus {
    timestamp: String,
    backend: StoreBackend,
    dimensions: usize,
    #[serde(flatten)]
    stats: StoreStats,
    warnings: Vec<String>,
}

pub async fn run(config: Option<&Path>, json: bool) -> Result<()> {
    let engine = super::engine(config)?;
    let stats = engine.stats().await?;
    let settings = engine.settings();

    let mut warnings = Vec::new();
    if stats.document_count > stats.embedding_count {
        warnings.push(format!(
            "{} articles have no embedding and are not searchable",
            stats.document_count - stats.embedding_count
        ));
    }
    if stats.document_count > 0 && stats.distinct_tags == 0 {
        warnings.push("no event tags indexed (is the tagging service up?)".to_string());
    }

    let status = IndexStatus {
        timestamp: Local::now().to_rfc3339(),
        backend: settings.store.backend,
        dimensions: settings.embedding.dimensions,
        stats,
        warnings,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "SEA News Index Status".bold());
    println!("{}", "=".repeat(50));
    println!();
    println!("Backend:      {:?}", status.backend);
    println!("Dimensions:   {}", status.dimensions);
    println!(
        "Articles:     {}",
        status.stats.document_count.to_string().cyan()
    );
    println!("With vectors: {}", status.stats.embedding_count);
    println!("Event tags:   {}", status.stats.distinct_tags);

    match (status.stats.earliest_date, status.stats.latest_date) {
        (Some(from), Some(to)) => println!("Date span:    {} .. {}", from, to),
        _ => println!("Date span:    {}", "-".dimmed()),
    }

    if let Some(ts) = status.stats.last_indexed {
        let when = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| ts.to_string());
        println!("Last indexed: {}", when);
    }

    if !status.warnings.is_empty() {
        println!();
        for warning in &status.warnings {
            println!("{} {}", "⚠".yellow(), warning);
        }
    }

    Ok(())
}
