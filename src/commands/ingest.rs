//! Ingest command - index one article or a batch from JSON/JSONL files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::*;
use serde::Serialize;
use walkdir::WalkDir;

use seanews_mcp::{ArticleInput, IngestReport};

/// Where the articles to ingest come from.
pub enum Source {
    Single(ArticleInput),
    File(PathBuf),
    Dir(PathBuf),
}

#[derive(Serialize)]
struct IngestSummary {
    ingested: usize,
    degraded: usize,
    failed: usize,
    results: Vec<IngestOutcome>,
}

#[derive(Serialize)]
struct IngestOutcome {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<IngestReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(config: Option<&Path>, source: Source, json: bool) -> Result<()> {
    let inputs = match source {
        Source::Single(input) => vec![input],
        Source::File(path) => load_inputs(&path)?,
        Source::Dir(dir) => collect_inputs(&dir)?,
    };
    if inputs.is_empty() {
        bail!("No articles to ingest");
    }

    let engine = super::engine(config)?;
    engine.ensure_index().await?;

    let urls: Vec<String> = inputs.iter().map(|i| i.url.clone()).collect();
    let results = engine.ingest_many(inputs).await;

    let mut summary = IngestSummary {
        ingested: 0,
        degraded: 0,
        failed: 0,
        results: Vec::with_capacity(results.len()),
    };
    for (url, result) in urls.into_iter().zip(results) {
        match result {
            Ok(report) => {
                summary.ingested += 1;
                if !report.warnings.is_empty() {
                    summary.degraded += 1;
                }
                summary.results.push(IngestOutcome {
                    url,
                    report: Some(report),
                    error: None,
                });
            }
            Err(e) => {
                summary.failed += 1;
                summary.results.push(IngestOutcome {
                    url,
                    report: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.failed > 0 && summary.ingested == 0 {
        bail!("All {} articles failed to ingest", summary.failed);
    }
    Ok(())
}

fn print_summary(summary: &IngestSummary) {
    for outcome in &summary.results {
        match (&outcome.report, &outcome.error) {
            (Some(report), _) if report.warnings.is_empty() => {
                println!(
                    "{} {} ({} tags)",
                    "✓".green(),
                    outcome.url,
                    report.article.tags.len()
                );
            }
            (Some(report), _) => {
                println!("{} {}", "!".yellow(), outcome.url);
                for warning in &report.warnings {
                    println!("   {}", warning.to_string().yellow());
                }
            }
            (None, Some(error)) => println!("{} {}: {}", "✗".red(), outcome.url, error),
            (None, None) => {}
        }
    }

    println!();
    println!("{}", "Summary".bold());
    println!("{}", "=".repeat(50));
    println!("Ingested: {}", summary.ingested.to_string().green());
    if summary.degraded > 0 {
        println!("Without tags: {}", summary.degraded.to_string().yellow());
    }
    println!(
        "Failed: {}",
        if summary.failed > 0 {
            summary.failed.to_string().red()
        } else {
            summary.failed.to_string().green()
        }
    );
}

/// Read articles from a JSON array, a single JSON object, or JSON Lines.
pub fn load_inputs(path: &Path) -> Result<Vec<ArticleInput>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_inputs(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_inputs(raw: &str) -> Result<Vec<ArticleInput>> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }
    if let Ok(single) = serde_json::from_str::<ArticleInput>(trimmed) {
        return Ok(vec![single]);
    }

    let mut inputs = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let input: ArticleInput = serde_json::from_str(line)
            .with_context(|| format!("line {}", lineno + 1))?;
        inputs.push(input);
    }
    Ok(inputs)
}

/// All `.json` / `.jsonl` files under `dir`, in path order.
pub fn collect_inputs(dir: &Path) -> Result<Vec<ArticleInput>> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|ext| ext.to_str()),
                Some("json") | Some("jsonl")
            )
        })
        .collect();
    files.sort();

    let mut inputs = Vec::new();
    for file in files {
        inputs.extend(load_inputs(&file)?);
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array_and_lines() -> Result<()> {
        let array = r#"[
            {"url": "https://www.straitstimes.com/a1", "location": "Singapore", "date": "2024-02-01"},
            {"url": "https://www.thestar.com.my/b1", "content": "Floods"}
        ]"#;
        let parsed = parse_inputs(array)?;
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].location.as_deref(), Some("Singapore"));
        assert_eq!(parsed[1].content.as_deref(), Some("Floods"));

        let lines = "{\"url\": \"https://a.example/1\"}\n\n{\"url\": \"https://a.example/2\"}\n";
        let parsed = parse_inputs(lines)?;
        assert_eq!(
            parsed.iter().map(|i| i.url.as_str()).collect::<Vec<_>>(),
            vec!["https://a.example/1", "https://a.example/2"]
        );

        assert!(parse_inputs("{\"url\": 1}").is_err());
        Ok(())
    }

    #[test]
    fn test_collect_inputs_walks_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("2024-02"))?;
        fs::write(
            dir.path().join("2024-02/st.jsonl"),
            "{\"url\": \"https://www.straitstimes.com/a1\"}\n{\"url\": \"https://www.straitstimes.com/a2\"}\n",
        )?;
        fs::write(
            dir.path().join("cna.json"),
            "[{\"url\": \"https://www.channelnewsasia.com/c1\"}]",
        )?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let inputs = collect_inputs(dir.path())?;
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].url, "https://www.straitstimes.com/a1");
        assert_eq!(inputs[2].url, "https://www.channelnewsasia.com/c1");
        Ok(())
    }
}
