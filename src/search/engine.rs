//! News engine - the public surface over store, clients and services
//!
//! Built once from immutable [`Settings`]; every operation is `&self` and
//! safe to call concurrently.

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::info;

use super::ingest::IngestPipeline;
use super::keyword::KeywordSearch;
use super::similar::{SimilarRequest, SimilarityService};
use super::tags::TagAggregator;
use crate::clients::{
    ArticleSource, Embedder, EventTagger, HttpEmbedder, HttpFetcher, HttpTagger, RetryPolicy,
};
use crate::config::{Settings, StoreBackend};
use crate::core::article::{ArticleInput, IngestReport, ScoredArticle, TagCount};
use crate::error::Result;
use crate::store::{bounded, DocumentStore, ElasticStore, SqliteStore, StoreStats};

pub struct NewsEngine {
    settings: Settings,
    store: Arc<dyn DocumentStore>,
    pipeline: IngestPipeline,
    similarity: SimilarityService,
    tags: TagAggregator,
    keywords: KeywordSearch,
}

impl NewsEngine {
    pub fn new(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn Embedder>,
        tagger: Arc<dyn EventTagger>,
        source: Arc<dyn ArticleSource>,
    ) -> Self {
        let timeout = settings.store_timeout();

        let pipeline = IngestPipeline::new(
            store.clone(),
            embedder,
            tagger,
            source,
            timeout,
            settings.fetch.default_language.clone(),
            settings.ingest.concurrency,
        );
        let similarity = SimilarityService::new(store.clone(), settings.similarity.clone(), timeout);
        let tags = TagAggregator::new(
            store.clone(),
            settings.tags.filter(),
            settings.tags.max_buckets,
            timeout,
        );
        let keywords = KeywordSearch::new(store.clone(), timeout, settings.similarity.default_top_k);

        Self {
            settings,
            store,
            pipeline,
            similarity,
            tags,
            keywords,
        }
    }

    /// Wire up the HTTP clients and the configured store backend.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let retry = RetryPolicy::from(&settings.retry);
        let dims = settings.embedding.dimensions;

        let store: Arc<dyn DocumentStore> = match settings.store.backend {
            StoreBackend::Sqlite => Arc::new(
                SqliteStore::open(&settings.store.sqlite_path, dims).with_context(|| {
                    format!(
                        "Failed to open database at {}",
                        settings.store.sqlite_path.display()
                    )
                })?,
            ),
            StoreBackend::Elasticsearch => Arc::new(
                ElasticStore::new(&settings.store, dims, retry)
                    .context("Failed to configure Elasticsearch store")?,
            ),
        };

        let embedder = Arc::new(
            HttpEmbedder::new(&settings.embedding, retry)
                .context("Failed to create embedding client")?,
        );
        let tagger = Arc::new(
            HttpTagger::new(&settings.tagger, retry)
                .context("Failed to create tagging client")?,
        );
        let fetcher = Arc::new(
            HttpFetcher::new(&settings.fetch, retry).context("Failed to create article fetcher")?,
        );

        info!(backend = ?settings.store.backend, dims, "engine ready");
        Ok(Self::new(settings, store, embedder, tagger, fetcher))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create the index (and vector mapping) if it does not exist yet.
    pub async fn ensure_index(&self) -> Result<bool> {
        Ok(bounded(self.settings.store_timeout(), self.store.ensure_index()).await?)
    }

    pub async fn ingest(&self, input: ArticleInput) -> Result<IngestReport> {
        self.pipeline.ingest(input).await
    }

    pub async fn ingest_many(&self, inputs: Vec<ArticleInput>) -> Vec<Result<IngestReport>> {
        self.pipeline.ingest_many(inputs).await
    }

    pub async fn similar(&self, request: &SimilarRequest) -> Result<Vec<ScoredArticle>> {
        self.similarity.similar(request).await
    }

    pub async fn top_tags(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        top_n: Option<usize>,
    ) -> Result<Vec<TagCount>> {
        let top_n = top_n.unwrap_or(self.settings.tags.default_top_n);
        self.tags.top_tags(start, end, top_n).await
    }

    pub async fn search(
        &self,
        keywords: &[String],
        limit: Option<usize>,
    ) -> Result<Vec<ScoredArticle>> {
        self.keywords.search(keywords, limit).await
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        Ok(bounded(self.settings.store_timeout(), self.store.stats()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::article::Location;
    use crate::search::similar::FilterKind;
    use crate::search::testing::{StaticEmbedder, StaticSource, StaticTagger};
    use std::collections::BTreeSet;

    fn engine(embedder: StaticEmbedder, tagger: StaticTagger) -> NewsEngine {
        let mut settings = Settings::default();
        settings.embedding.dimensions = 3;
        let store = Arc::new(SqliteStore::open_in_memory(3).unwrap());
        NewsEngine::new(
            settings,
            store,
            Arc::new(embedder),
            Arc::new(tagger),
            Arc::new(StaticSource::default()),
        )
    }

    fn article(url: &str, content: &str, date: &str) -> ArticleInput {
        ArticleInput {
            url: url.to_string(),
            title: Some(content.to_string()),
            content: Some(content.to_string()),
            site: Some("straitstimes".to_string()),
            location: Some("Singapore".to_string()),
            date: Some(date.to_string()),
            language: Some("en".to_string()),
        }
    }

    #[tokio::test]
    async fn test_ingest_then_query_end_to_end() -> Result<()> {
        let embedder = StaticEmbedder::new(vec![0.0, 0.0, 1.0])
            .with("floods in bedok", vec![1.0, 0.0, 0.0])
            .with("floods in tampines", vec![0.9, 0.1, 0.0])
            .with("floods in jurong", vec![0.6, 0.4, 0.0])
            .with("budget debate", vec![0.1, 0.9, 0.0]);
        let engine = engine(embedder, StaticTagger::new(&["flooding"]));
        assert!(engine.ensure_index().await?);

        let a1 = "https://www.straitstimes.com/a1";
        let report = engine.ingest(article(a1, "floods in bedok", "2024-02-01")).await?;
        assert_eq!(report.article.location, Location::Singapore);
        assert_eq!(report.article.tags, BTreeSet::from(["flooding".to_string()]));

        let batch = engine
            .ingest_many(vec![
                article("https://www.straitstimes.com/a2", "floods in tampines", "2024-02-02"),
                article("https://www.straitstimes.com/a3", "floods in jurong", "2024-02-03"),
                article("https://www.straitstimes.com/a4", "budget debate", "2024-02-04"),
            ])
            .await;
        assert!(batch.iter().all(|r| r.is_ok()));

        let hits = engine
            .similar(&SimilarRequest::new(a1, FilterKind::Site).top_k(5))
            .await?;
        let urls: Vec<_> = hits.iter().map(|h| h.article.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.straitstimes.com/a2",
                "https://www.straitstimes.com/a3",
                "https://www.straitstimes.com/a4",
            ]
        );

        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let tags = engine.top_tags(start, end, None).await?;
        assert_eq!(tags, vec![TagCount::new("flooding", 4)]);

        let found = engine.search(&["jurong".to_string()], None).await?;
        assert_eq!(found.len(), 1);

        let stats = engine.stats().await?;
        assert_eq!(stats.document_count, 4);
        assert_eq!(stats.embedding_count, 4);
        Ok(())
    }
}
