//! Test doubles for the external services and the store.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use url::Url;

use crate::clients::{ArticleSource, ClientError, Embedder, EventTagger, FetchedArticle};
use crate::core::article::{Document, Location, ScoredArticle, TagCount};
use crate::store::{DocumentStore, KnnQuery, StoreError, StoreResult, StoreStats};

pub fn document(
    url: &str,
    site: &str,
    (y, m, d): (i32, u32, u32),
    embedding: Vec<f32>,
    tags: &[&str],
) -> Document {
    Document {
        url: url.to_string(),
        title: format!("Title {}", url),
        content: format!("Content {}", url),
        language: "en".to_string(),
        location: Location::Singapore,
        site: site.to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        embedding,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Embeds known texts to fixed vectors, anything else to `fallback`.
pub struct StaticEmbedder {
    pub dimensions: usize,
    pub vectors: HashMap<String, Vec<f32>>,
    pub fallback: Vec<f32>,
    pub calls: AtomicUsize,
}

impl StaticEmbedder {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            dimensions: fallback.len(),
            vectors: HashMap::new(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn dimensions(&self) -> usize {
        3
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ClientError> {
        Err(ClientError::Timeout)
    }
}

pub struct StaticTagger {
    pub tags: BTreeSet<String>,
    pub calls: AtomicUsize,
}

impl StaticTagger {
    pub fn new(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventTagger for StaticTagger {
    async fn tag(&self, _text: &str) -> Result<BTreeSet<String>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tags.clone())
    }
}

pub struct DownTagger;

#[async_trait]
impl EventTagger for DownTagger {
    async fn tag(&self, _text: &str) -> Result<BTreeSet<String>, ClientError> {
        Err(ClientError::Transport("connection refused".to_string()))
    }
}

/// Serves canned pages; unknown URLs answer 404.
#[derive(Default)]
pub struct StaticSource {
    pub pages: HashMap<String, FetchedArticle>,
    pub calls: AtomicUsize,
}

impl StaticSource {
    pub fn with(mut self, url: &str, page: FetchedArticle) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleSource for StaticSource {
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or(ClientError::Status {
                status: 404,
                body: "not found".to_string(),
            })
    }
}

/// A store whose every call fails as unreachable.
pub struct UnavailableStore;

pub fn unavailable_store() -> Arc<dyn DocumentStore> {
    Arc::new(UnavailableStore)
}

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unreachable("connection refused".to_string()))
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn ensure_index(&self) -> StoreResult<bool> {
        down()
    }

    async fn upsert(&self, _doc: &Document) -> StoreResult<()> {
        down()
    }

    async fn get(&self, _url: &str) -> StoreResult<Option<Document>> {
        down()
    }

    async fn nearest(&self, _query: &KnnQuery) -> StoreResult<Vec<ScoredArticle>> {
        down()
    }

    async fn tag_counts(
        &self,
        _from: NaiveDate,
        _to: NaiveDate,
        _limit: usize,
    ) -> StoreResult<Vec<TagCount>> {
        down()
    }

    async fn keyword_search(
        &self,
        _keywords: &[String],
        _limit: usize,
    ) -> StoreResult<Vec<ScoredArticle>> {
        down()
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        down()
    }
}

/// A store that never answers.
pub struct HangingStore;

#[async_trait]
impl DocumentStore for HangingStore {
    async fn ensure_index(&self) -> StoreResult<bool> {
        std::future::pending().await
    }

    async fn upsert(&self, _doc: &Document) -> StoreResult<()> {
        std::future::pending().await
    }

    async fn get(&self, _url: &str) -> StoreResult<Option<Document>> {
        std::future::pending().await
    }

    async fn nearest(&self, _query: &KnnQuery) -> StoreResult<Vec<ScoredArticle>> {
        std::future::pending().await
    }

    async fn tag_counts(
        &self,
        _from: NaiveDate,
        _to: NaiveDate,
        _limit: usize,
    ) -> StoreResult<Vec<TagCount>> {
        std::future::pending().await
    }

    async fn keyword_search(
        &self,
        _keywords: &[String],
        _limit: usize,
    ) -> StoreResult<Vec<ScoredArticle>> {
        std::future::pending().await
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        std::future::pending().await
    }
}
