pub mod ingest;
pub mod init;
pub mod search;
pub mod similar;
pub mod status;
pub mod tags;

use std::path::Path;

use anyhow::Result;
use colored::*;

use seanews_mcp::{NewsEngine, ScoredArticle, Settings};

/// Load settings and build the engine every command runs against.
pub fn engine(config: Option<&Path>) -> Result<NewsEngine> {
    let settings = Settings::load(config)?;
    NewsEngine::from_settings(settings)
}

/// Truncate for display (char-aware for Unicode)
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Numbered, colour-coded listing shared by `similar` and `search`.
pub fn print_scored(results: &[ScoredArticle], similarity: bool) {
    for (i, hit) in results.iter().enumerate() {
        let score_str = format!("{:.2}", hit.score);
        let score_colored = if !similarity {
            score_str.normal()
        } else if hit.score > 0.8 {
            score_str.green()
        } else if hit.score > 0.6 {
            score_str.yellow()
        } else {
            score_str.dimmed()
        };

        let title = if hit.article.title.is_empty() {
            hit.article.url.as_str()
        } else {
            hit.article.title.as_str()
        };

        println!(
            "{}. [{}] {}",
            (i + 1).to_string().bold(),
            score_colored,
            title.cyan()
        );
        println!(
            "   {} | {} | {}",
            hit.article.site,
            hit.article.date,
            hit.article.location
        );
        println!("   {}", preview(&hit.article.content, 100).dimmed());
        if !hit.article.tags.is_empty() {
            let tags: Vec<&str> = hit.article.tags.iter().map(String::as_str).collect();
            println!("   {} {}", "#".dimmed(), tags.join(", "));
        }
        println!("   {}", hit.article.url.dimmed());
        println!();
    }
}
