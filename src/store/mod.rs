//! Document store
//!
//! One record per article URL with lexical, structured and vector fields.
//! Two backends share the [`DocumentStore`] contract:
//!
//! - [`SqliteStore`]: embedded, single node, cosine computed in Rust
//! - [`ElasticStore`]: Elasticsearch `dense_vector` + kNN + terms aggregation

pub mod elastic;
pub mod sqlite;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::core::article::{Article, Document, ScoredArticle, TagCount};

pub use elastic::ElasticStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store call timed out after {0} ms")]
    Timeout(u64),

    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("store rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("index schema mismatch: {0}")]
    Schema(String),

    #[error("malformed store response: {0}")]
    Malformed(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Structured pre-filter for similarity retrieval. Exactly one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateFilter {
    Site(String),
    /// Inclusive on both ends.
    DateRange { from: NaiveDate, to: NaiveDate },
}

impl CandidateFilter {
    pub fn admits(&self, article: &Article) -> bool {
        match self {
            Self::Site(site) => article.site == *site,
            Self::DateRange { from, to } => article.date >= *from && article.date <= *to,
        }
    }
}

/// Nearest-neighbour request against stored embeddings.
#[derive(Debug, Clone)]
pub struct KnnQuery {
    pub vector: Vec<f32>,
    pub filter: CandidateFilter,
    /// Seed URL, never part of the result.
    pub exclude_url: String,
    pub k: usize,
    /// Minimum cosine similarity.
    pub min_score: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub document_count: usize,
    pub embedding_count: usize,
    pub distinct_tags: usize,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
    /// Unix seconds of the most recent upsert.
    pub last_indexed: Option<i64>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the index and mapping if missing. Returns true if it was created.
    async fn ensure_index(&self) -> StoreResult<bool>;

    /// Insert or fully replace the document keyed by its URL, atomically.
    async fn upsert(&self, doc: &Document) -> StoreResult<()>;

    async fn get(&self, url: &str) -> StoreResult<Option<Document>>;

    /// Cosine-ranked neighbours within the filter, best first, at most `k`.
    async fn nearest(&self, query: &KnnQuery) -> StoreResult<Vec<ScoredArticle>>;

    /// Per-tag document counts for documents dated within `[from, to]`,
    /// ordered by count desc then tag asc, at most `limit` buckets.
    async fn tag_counts(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> StoreResult<Vec<TagCount>>;

    /// Lexical match over content and tags. Backend-specific relevance score.
    async fn keyword_search(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> StoreResult<Vec<ScoredArticle>>;

    async fn stats(&self) -> StoreResult<StoreStats>;
}

/// Run a store call with an upper time bound.
pub async fn bounded<T, F>(timeout: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(timeout.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::article::Location;
    use std::collections::BTreeSet;

    fn article(site: &str, date: NaiveDate) -> Article {
        Article {
            url: "https://example.com/x".to_string(),
            title: String::new(),
            content: String::new(),
            language: "en".to_string(),
            location: Location::Malaysia,
            site: site.to_string(),
            date,
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn test_filter_admits() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        let site = CandidateFilter::Site("thestar".to_string());
        assert!(site.admits(&article("thestar", d(1))));
        assert!(!site.admits(&article("malaymail", d(1))));

        let range = CandidateFilter::DateRange { from: d(1), to: d(10) };
        assert!(range.admits(&article("thestar", d(1))));
        assert!(range.admits(&article("thestar", d(10))));
        assert!(!range.admits(&article("thestar", d(11))));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: StoreResult<()> = bounded(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(StoreError::Timeout(5))));
    }
}
