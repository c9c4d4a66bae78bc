//! seanews library
//!
//! Semantic retrieval and event-tag aggregation over Southeast Asian news.
//!
//! # Modules
//!
//! - `core`: Article/document model, date and text normalization, tag filtering
//! - `clients`: Embedding, event-tagging and article-fetching clients
//! - `store`: Document store trait with SQLite and Elasticsearch backends
//! - `search`: Ingestion pipeline, similarity, tag aggregation and keyword search

pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod search;
pub mod store;

// Re-exports for convenience
pub use config::Settings;
pub use crate::core::article::{
    Article, ArticleInput, Document, IngestReport, IngestWarning, Location, ScoredArticle,
    TagCount,
};
pub use error::{NewsError, Result};
pub use search::engine::NewsEngine;
pub use search::similar::{FilterKind, SimilarRequest};
pub use store::{DocumentStore, StoreError};
