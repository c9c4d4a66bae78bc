//! News MCP server implementation

use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use seanews_mcp::core::date::parse_iso_date;
use seanews_mcp::{ArticleInput, FilterKind, NewsEngine, NewsError, SimilarRequest};

/// Parameters for news_similar tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SimilarParams {
    #[schemars(description = "URL of an already indexed article to use as the seed")]
    pub seed_url: String,
    #[schemars(description = "Filter dimension: \"site\" or \"date\"")]
    pub filter: String,
    #[schemars(
        description = "Site name (site filter) or YYYY-MM-DD anchor date (date filter). Defaults to the seed's own value"
    )]
    #[serde(default)]
    pub filter_value: Option<String>,
    #[schemars(description = "Maximum number of results (default: 10)")]
    #[serde(default)]
    pub top_k: Option<usize>,
    #[schemars(description = "Half-width in days of the date window (default: 30)")]
    #[serde(default)]
    pub window_days: Option<i64>,
}

/// Parameters for news_top_tags tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TopTagsParams {
    #[schemars(description = "Start date, inclusive (YYYY-MM-DD)")]
    pub start_date: String,
    #[schemars(description = "End date, inclusive (YYYY-MM-DD)")]
    pub end_date: String,
    #[schemars(description = "Number of tags to return (default: 25)")]
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Parameters for news_search tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Keywords or phrases to match against article content and tags")]
    pub keywords: Vec<String>,
    #[schemars(description = "Maximum number of results (default: 10)")]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for news_ingest tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IngestParams {
    #[schemars(description = "Article URL (http or https)")]
    pub url: String,
    #[schemars(description = "Country: Singapore, Malaysia or Indonesia")]
    pub location: String,
    #[schemars(description = "Publication date; fetched from the page when omitted")]
    #[serde(default)]
    pub date: Option<String>,
    #[schemars(description = "Article title")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "Article body; the page is fetched when omitted")]
    #[serde(default)]
    pub content: Option<String>,
    #[schemars(description = "Publishing site; derived from the URL host when omitted")]
    #[serde(default)]
    pub site: Option<String>,
    #[schemars(description = "ISO language code (default: en)")]
    #[serde(default)]
    pub language: Option<String>,
}

impl From<IngestParams> for ArticleInput {
    fn from(p: IngestParams) -> Self {
        ArticleInput {
            url: p.url,
            title: p.title,
            content: p.content,
            site: p.site,
            location: Some(p.location),
            date: p.date,
            language: p.language,
        }
    }
}

#[derive(Debug, Serialize)]
struct TopTagsJson<'a> {
    start_date: &'a str,
    end_date: &'a str,
    tags: Vec<seanews_mcp::TagCount>,
}

/// Caller mistakes become invalid-params; everything else is internal.
fn to_mcp_error(e: NewsError) -> McpError {
    match e {
        NewsError::Validation(_) | NewsError::NotFound(_) => {
            McpError::invalid_params(e.to_string(), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

/// News MCP Service
#[derive(Clone)]
pub struct NewsService {
    engine: Arc<NewsEngine>,
    tool_router: ToolRouter<Self>,
}

impl NewsService {
    pub fn new(engine: Arc<NewsEngine>) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl NewsService {
    #[tool(description = "Find indexed news articles most similar to a seed article, restricted to the same site or to a date window around the seed.")]
    async fn news_similar(
        &self,
        params: Parameters<SimilarParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let filter: FilterKind = p.filter.parse().map_err(to_mcp_error)?;
        let request = SimilarRequest {
            seed_url: p.seed_url,
            filter,
            filter_value: p.filter_value,
            top_k: p.top_k,
            window_days: p.window_days,
        };

        let results = self.engine.similar(&request).await.map_err(to_mcp_error)?;
        json_result(&results)
    }

    #[tool(description = "Most frequent event tags across articles published within a date range, with article counts.")]
    async fn news_top_tags(
        &self,
        params: Parameters<TopTagsParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let start = parse_iso_date(&p.start_date).map_err(to_mcp_error)?;
        let end = parse_iso_date(&p.end_date).map_err(to_mcp_error)?;

        let tags = self
            .engine
            .top_tags(start, end, p.top_n)
            .await
            .map_err(to_mcp_error)?;
        json_result(&TopTagsJson {
            start_date: &p.start_date,
            end_date: &p.end_date,
            tags,
        })
    }

    #[tool(description = "Keyword search over article content and event tags. Exact phrases rank higher.")]
    async fn news_search(
        &self,
        params: Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let results = self
            .engine
            .search(&p.keywords, p.limit)
            .await
            .map_err(to_mcp_error)?;
        json_result(&results)
    }

    #[tool(description = "Index a news article: embeds and tags its content and stores it keyed by URL. Re-ingesting a URL replaces it.")]
    async fn news_ingest(
        &self,
        params: Parameters<IngestParams>,
    ) -> Result<CallToolResult, McpError> {
        let report = self
            .engine
            .ingest(params.0.into())
            .await
            .map_err(to_mcp_error)?;
        json_result(&report)
    }

    #[tool(description = "Index statistics: article count, vectors, distinct tags and covered date span.")]
    async fn news_status(&self) -> Result<CallToolResult, McpError> {
        let stats = self.engine.stats().await.map_err(to_mcp_error)?;
        json_result(&stats)
    }
}

#[tool_handler]
impl ServerHandler for NewsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "SEA news MCP server. Semantic similarity, event-tag trends and keyword search over Singapore, Malaysia and Indonesia news.".to_string()
            ),
            ..Default::default()
        }
    }
}

/// Run the MCP server
pub async fn run_mcp_server(engine: NewsEngine) -> Result<()> {
    use tokio::io::{stdin, stdout};

    engine.ensure_index().await?;
    info!("starting MCP server on stdio");

    let service = NewsService::new(Arc::new(engine));
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
