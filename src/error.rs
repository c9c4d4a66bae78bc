//! Error taxonomy for the ingestion and query paths.

use thiserror::Error;

use crate::clients::ClientError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum NewsError {
    /// Malformed or missing input, rejected before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No article found with URL: {0}")]
    NotFound(String),

    #[error("Failed to fetch article {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: ClientError,
    },

    #[error("Embedding service failed: {0}")]
    EmbeddingService(#[source] ClientError),

    /// Only ever recorded as an ingest warning; `ingest` does not return it.
    #[error("Tagging service failed: {0}")]
    TaggingService(#[source] ClientError),

    #[error("Document store unavailable: {0}")]
    ServiceUnavailable(#[from] StoreError),
}

impl NewsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;
