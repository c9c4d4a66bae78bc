mod commands;
#[cfg(feature = "mcp")]
mod mcp;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ingest::Source;
use seanews_mcp::{ArticleInput, FilterKind, SimilarRequest};

#[derive(Parser)]
#[command(name = "seanews")]
#[command(about = "Semantic retrieval and event-tag trends for Southeast Asian news", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Config file (default: ./seanews.toml if present)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the index and vector mapping if missing
    Init {
        #[arg(long, help = "Print the effective configuration")]
        show_config: bool,
    },
    /// Index articles (single URL, JSON/JSONL file, or directory of files)
    Ingest {
        #[arg(required_unless_present_any = ["file", "dir"], conflicts_with_all = ["file", "dir"])]
        url: Option<String>,
        #[arg(long, help = "Article title")]
        title: Option<String>,
        #[arg(long, help = "Article body (fetched from the URL when omitted)")]
        content: Option<String>,
        #[arg(long, help = "Publishing site (default: URL host)")]
        site: Option<String>,
        #[arg(long, help = "Singapore | Malaysia | Indonesia")]
        location: Option<String>,
        #[arg(long, help = "Publication date, e.g. 2024-02-01")]
        date: Option<String>,
        #[arg(long, help = "ISO language code")]
        language: Option<String>,
        #[arg(long, conflicts_with = "dir", help = "JSON array or JSON Lines file of articles")]
        file: Option<PathBuf>,
        #[arg(long, help = "Directory walked for .json/.jsonl files")]
        dir: Option<PathBuf>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Articles most similar to an indexed seed article
    Similar {
        seed_url: String,
        #[arg(long, short, default_value = "site", help = "Filter dimension: site | date")]
        filter: String,
        #[arg(long, help = "Site name or anchor date overriding the seed's")]
        value: Option<String>,
        #[arg(long, short = 'k', help = "Maximum results")]
        top_k: Option<usize>,
        #[arg(long, help = "Date window half-width in days")]
        window_days: Option<i64>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Most frequent event tags in a date range
    Tags {
        #[arg(long, help = "Start date, inclusive (YYYY-MM-DD)")]
        start: String,
        #[arg(long, help = "End date, inclusive (YYYY-MM-DD)")]
        end: String,
        #[arg(long, short = 'n', help = "Number of tags")]
        top_n: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Keyword search over content and tags
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,
        #[arg(long, short, help = "Limit results")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Index statistics
    Status {
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== MCP Server =====
    /// Start MCP server on stdio
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show client configuration instructions")]
        install: bool,
    },
}

fn init_tracing() {
    // stdout belongs to --json output and the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.config.as_deref();
    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Init { show_config } => runtime.block_on(commands::init::run(config, show_config)),
        Commands::Ingest {
            url,
            title,
            content,
            site,
            location,
            date,
            language,
            file,
            dir,
            json,
        } => {
            let source = match (url, file, dir) {
                (_, Some(file), _) => Source::File(file),
                (_, _, Some(dir)) => Source::Dir(dir),
                (Some(url), None, None) => Source::Single(ArticleInput {
                    url,
                    title,
                    content,
                    site,
                    location,
                    date,
                    language,
                }),
                (None, None, None) => anyhow::bail!("Provide a URL, --file or --dir"),
            };
            runtime.block_on(commands::ingest::run(config, source, json))
        }
        Commands::Similar {
            seed_url,
            filter,
            value,
            top_k,
            window_days,
            json,
        } => {
            let request = SimilarRequest {
                seed_url,
                filter: filter.parse::<FilterKind>()?,
                filter_value: value,
                top_k,
                window_days,
            };
            runtime.block_on(commands::similar::run(config, request, json))
        }
        Commands::Tags {
            start,
            end,
            top_n,
            json,
        } => runtime.block_on(commands::tags::run(config, &start, &end, top_n, json)),
        Commands::Search {
            keywords,
            limit,
            json,
        } => runtime.block_on(commands::search::run(config, &keywords, limit, json)),
        Commands::Status { json } => runtime.block_on(commands::status::run(config, json)),

        // MCP Server
        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                print_mcp_install_instructions(config);
                Ok(())
            } else {
                let engine = commands::engine(config)?;
                runtime.block_on(mcp::run_mcp_server(engine))
            }
        }
    }
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions(config: Option<&std::path::Path>) {
    use colored::Colorize;

    let cwd = std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "/path/to/project".to_string());

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "seanews".to_string());

    let args = match config {
        Some(path) => format!(r#"["--config", "{}", "mcp"]"#, path.display()),
        None => r#"["mcp"]"#.to_string(),
    };

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your MCP client configuration:");
    println!();
    println!(
        r#"{{
  "mcpServers": {{
    "seanews": {{
      "command": "{}",
      "args": {},
      "cwd": "{}"
    }}
  }}
}}"#,
        binary_path, args, cwd
    );
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - Similar articles by site or date window", "news_similar".green());
    println!("  • {} - Most frequent event tags in a date range", "news_top_tags".green());
    println!("  • {} - Keyword search over content and tags", "news_search".green());
    println!("  • {} - Index an article", "news_ingest".green());
    println!("  • {} - Index statistics", "news_status".green());
}
