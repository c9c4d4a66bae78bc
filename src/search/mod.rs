//! Retrieval services
//!
//! - `ingest`: fetch, embed, tag and upsert articles
//! - `similar`: seed-anchored vector similarity under a site or date filter
//! - `tags`: event-tag frequency over a date range
//! - `keyword`: lexical search over content and tags
//! - `engine`: [`NewsEngine`], the facade tying them to one store

pub mod engine;
pub mod ingest;
pub mod keyword;
pub mod ranking;
pub mod similar;
pub mod tags;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::NewsEngine;
pub use ingest::IngestPipeline;
pub use keyword::KeywordSearch;
pub use similar::{FilterKind, SimilarRequest, SimilarityService};
pub use tags::TagAggregator;
