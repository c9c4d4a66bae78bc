use std::path::Path;

use anyhow::Result;
use colored::*;
use serde::Serialize;

use seanews_mcp::core::date::parse_iso_date;
use seanews_mcp::TagCount;

#[derive(Serialize)]
struct TagsResult {
    start_date: String,
    end_date: String,
    tags: Vec<TagCount>,
}

pub async fn run(
    config: Option<&Path>,
    start: &str,
    end: &str,
    top_n: Option<usize>,
    json: bool,
) -> Result<()> {
    let start = parse_iso_date(start)?;
    let end = parse_iso_date(end)?;

    let engine = super::engine(config)?;
    let tags = engine.top_tags(start, end, top_n).await?;

    if json {
        let result = TagsResult {
            start_date: start.to_string(),
            end_date: end.to_string(),
            tags,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", format!("Top event tags {} .. {}", start, end).bold());
    println!("{}", "=".repeat(50));

    if tags.is_empty() {
        println!("{} No tagged articles in range", "→".dimmed());
        return Ok(());
    }

    let width = tags.iter().map(|t| t.tag.chars().count()).max().unwrap_or(0);
    let max = tags.first().map(|t| t.count).unwrap_or(1).max(1);
    for (i, tc) in tags.iter().enumerate() {
        let bar_len = ((tc.count as f64 / max as f64) * 30.0).ceil() as usize;
        println!(
            "{:>3}. {:<width$}  {:>5}  {}",
            i + 1,
            tc.tag,
            tc.count.to_string().cyan(),
            "█".repeat(bar_len).green(),
            width = width
        );
    }

    Ok(())
}
