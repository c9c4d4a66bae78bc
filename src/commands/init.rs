use std::path::Path;

use anyhow::Result;
use colored::*;

use seanews_mcp::config::StoreBackend;

pub async fn run(config: Option<&Path>, show_config: bool) -> Result<()> {
    let engine = super::engine(config)?;
    let settings = engine.settings();

    println!("{}", "SEA News Index Setup".bold());
    println!("{}", "=".repeat(50));
    println!();

    match settings.store.backend {
        StoreBackend::Sqlite => println!(
            "Backend: {} ({})",
            "sqlite".cyan(),
            settings.store.sqlite_path.display()
        ),
        StoreBackend::Elasticsearch => println!(
            "Backend: {} ({}/{})",
            "elasticsearch".cyan(),
            settings.store.elastic_url.trim_end_matches('/'),
            settings.store.index_name
        ),
    }
    println!("Embedding dimensions: {}", settings.embedding.dimensions);
    println!();

    if engine.ensure_index().await? {
        println!("{} Created index", "✓".green());
    } else {
        println!("{} Index already exists", "✓".green());
    }

    if show_config {
        println!();
        println!("{}", "Effective configuration".bold());
        println!("{}", serde_json::to_string_pretty(settings)?);
    }

    Ok(())
}
