//! Ingestion pipeline
//!
//! Turns an [`ArticleInput`] into a fully populated [`Document`]:
//! validate, fetch when no content was supplied, embed and tag concurrently,
//! then upsert. Embedding failure is fatal; tagging failure only degrades the
//! record to an empty tag set.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use url::Url;

use crate::clients::embedding::check_embedding;
use crate::clients::{ArticleSource, Embedder, EventTagger};
use crate::core::article::{ArticleInput, Document, IngestReport, IngestWarning, Location};
use crate::core::date::parse_date;
use crate::core::text::{normalize_whitespace, site_from_url};
use crate::error::{NewsError, Result};
use crate::store::{bounded, DocumentStore};

pub struct IngestPipeline {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn Embedder>,
    tagger: Arc<dyn EventTagger>,
    source: Arc<dyn ArticleSource>,
    timeout: Duration,
    default_language: String,
    concurrency: usize,
}

/// Fields that passed validation before any network call.
struct Checked {
    url: String,
    parsed: Url,
    location: Location,
    date: Option<NaiveDate>,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn Embedder>,
        tagger: Arc<dyn EventTagger>,
        source: Arc<dyn ArticleSource>,
        timeout: Duration,
        default_language: impl Into<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            tagger,
            source,
            timeout,
            default_language: default_language.into(),
            concurrency: concurrency.max(1),
        }
    }

    /// Ingest one article. Safe to retry: the document is replaced by URL.
    pub async fn ingest(&self, input: ArticleInput) -> Result<IngestReport> {
        let checked = check_input(&input)?;
        let doc_url = checked.url.clone();

        let mut title = input.title.as_deref().map(normalize_whitespace);
        let mut content = input.content.as_deref().map(normalize_whitespace);
        let mut language = input.language.clone();
        let mut date = checked.date;

        if input.needs_fetch() {
            debug!(url = %doc_url, "fetching article body");
            let page = self
                .source
                .fetch(&checked.parsed)
                .await
                .map_err(|source| NewsError::Fetch {
                    url: doc_url.clone(),
                    source,
                })?;

            content = Some(normalize_whitespace(&page.content));
            title = title.filter(|t| !t.is_empty()).or(page.title);
            language = language.or(page.language);
            if date.is_none() {
                date = page.published.as_deref().map(parse_date).transpose()?;
            }
        }

        let content = content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| NewsError::validation(format!("no article content for {}", doc_url)))?;
        let date = date.ok_or_else(|| {
            NewsError::validation(format!("date is required for {}", doc_url))
        })?;
        let site = input
            .site
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| site_from_url(&checked.parsed))
            .ok_or_else(|| NewsError::validation(format!("cannot derive site for {}", doc_url)))?;
        let language = language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.default_language.clone());

        // Both requests go out together; the write waits for both outcomes.
        let (embedded, tagged) = tokio::join!(
            self.embedder.embed(&content),
            self.tagger.tag(&content)
        );

        let embedding = embedded.map_err(NewsError::EmbeddingService)?;
        check_embedding(&embedding, self.embedder.dimensions())
            .map_err(NewsError::EmbeddingService)?;

        let mut warnings = Vec::new();
        let tags = match tagged {
            Ok(tags) => tags,
            Err(e) => {
                let degraded = NewsError::TaggingService(e);
                warn!(url = %doc_url, error = %degraded, "indexing without tags");
                warnings.push(IngestWarning::TaggingDegraded {
                    reason: degraded.to_string(),
                });
                BTreeSet::new()
            }
        };

        let doc = Document {
            url: checked.url,
            title: title.unwrap_or_default(),
            content,
            language,
            location: checked.location,
            site,
            date,
            embedding,
            tags,
        };

        bounded(self.timeout, self.store.upsert(&doc)).await?;
        info!(url = %doc.url, site = %doc.site, date = %doc.date, tags = doc.tags.len(), "indexed");

        Ok(IngestReport {
            article: doc.to_article(),
            warnings,
        })
    }

    /// Ingest a batch with bounded concurrency. Results follow input order.
    pub async fn ingest_many(&self, inputs: Vec<ArticleInput>) -> Vec<Result<IngestReport>> {
        stream::iter(inputs)
            .map(|input| self.ingest(input))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// Validate what can be validated without touching the network.
fn check_input(input: &ArticleInput) -> Result<Checked> {
    let url = input.url.trim();
    if url.is_empty() {
        return Err(NewsError::validation("url is required"));
    }
    let parsed = Url::parse(url)
        .map_err(|e| NewsError::validation(format!("malformed url '{}': {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(NewsError::validation(format!(
            "unsupported url scheme '{}' (must be http or https)",
            parsed.scheme()
        )));
    }

    let location = input
        .location
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| NewsError::validation("location is required"))?
        .parse::<Location>()?;

    let date = input
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(parse_date)
        .transpose()?;

    Ok(Checked {
        url: url.to_string(),
        parsed,
        location,
        date,
    })
}
