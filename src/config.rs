//! Settings loader.
//!
//! Uses Figment to merge built-in defaults, `seanews.toml` (or an explicit
//! file) and `SEANEWS_*` environment variables. Nested keys use `__`, e.g.
//! `SEANEWS_STORE__BACKEND=elasticsearch`.
//!
//! The resulting [`Settings`] is immutable and handed to the engine at
//! construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::tag_filter::{TagFilter, DEFAULT_EXCLUDED_TAGS};

pub const DEFAULT_CONFIG_FILE: &str = "seanews.toml";
pub const ENV_PREFIX: &str = "SEANEWS_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub embedding: EmbeddingSettings,
    pub tagger: TaggerSettings,
    pub fetch: FetchSettings,
    pub retry: RetrySettings,
    pub similarity: SimilaritySettings,
    pub tags: TagSettings,
    pub ingest: IngestSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Elasticsearch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub sqlite_path: PathBuf,
    pub elastic_url: String,
    pub index_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upper bound for any single store read or write.
    pub timeout_ms: u64,
    /// Elasticsearch kNN candidate pool per shard.
    pub num_candidates: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            sqlite_path: PathBuf::from(".seanews/articles.db"),
            elastic_url: "http://localhost:9200".to_string(),
            index_name: "articles".to_string(),
            username: None,
            password: None,
            timeout_ms: 5_000,
            num_candidates: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub url: String,
    /// Vector dimensionality D. Changing it requires a reindex.
    pub dimensions: usize,
    pub timeout_ms: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/embed".to_string(),
            dimensions: 768,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerSettings {
    pub url: String,
    pub timeout_ms: u64,
    /// Spans scored below this are discarded.
    pub min_score: f32,
}

impl Default for TaggerSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081/predict".to_string(),
            timeout_ms: 10_000,
            min_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    pub timeout_ms: u64,
    pub max_redirects: usize,
    /// Guard against huge pages.
    pub max_chars: usize,
    pub default_language: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("seanews/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 20_000,
            max_redirects: 8,
            max_chars: 200_000,
            default_language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilaritySettings {
    /// Half-width of the symmetric, inclusive window for date-filtered queries.
    pub date_window_days: i64,
    pub default_top_k: usize,
    pub max_top_k: usize,
    /// Minimum cosine similarity for a neighbour to be returned.
    pub min_score: Option<f32>,
}

impl Default for SimilaritySettings {
    fn default() -> Self {
        Self {
            date_window_days: 30,
            default_top_k: 10,
            max_top_k: 100,
            min_score: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSettings {
    pub default_top_n: usize,
    /// Buckets requested from the store before noise filtering.
    pub max_buckets: usize,
    pub excluded: Vec<String>,
    pub drop_numeric: bool,
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            default_top_n: 25,
            max_buckets: 1_000,
            excluded: DEFAULT_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect(),
            drop_numeric: true,
        }
    }
}

impl TagSettings {
    pub fn filter(&self) -> TagFilter {
        TagFilter::new(self.excluded.iter().cloned(), self.drop_numeric)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Articles ingested in parallel by batch ingestion.
    pub concurrency: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl Settings {
    /// Load settings from defaults, a TOML file and the environment.
    ///
    /// With `path = None`, `seanews.toml` in the working directory is used
    /// if present. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.exists() {
                    bail!("Config file not found: {}", p.display());
                }
                p.to_path_buf()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding.dimensions == 0 {
            bail!("embedding.dimensions must be positive");
        }
        if self.embedding.url.trim().is_empty() {
            bail!("embedding.url must be set");
        }
        if self.tagger.url.trim().is_empty() {
            bail!("tagger.url must be set");
        }
        if self.similarity.date_window_days <= 0 {
            bail!("similarity.date_window_days must be a positive integer");
        }
        if self.similarity.default_top_k == 0 || self.similarity.max_top_k == 0 {
            bail!("similarity top-k limits must be positive");
        }
        if self.tags.default_top_n == 0 || self.tags.max_buckets == 0 {
            bail!("tags.default_top_n and tags.max_buckets must be positive");
        }
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if self.store.timeout_ms == 0 {
            bail!("store.timeout_ms must be positive");
        }
        if self.store.backend == StoreBackend::Elasticsearch
            && self.store.index_name.trim().is_empty()
        {
            bail!("store.index_name must be set for the elasticsearch backend");
        }
        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store.timeout_ms)
    }
}
