//! Clients for the external inference services and article sources.
//!
//! The bi-encoder and the token classifier are black boxes behind the
//! [`Embedder`] and [`EventTagger`] traits: text in, vector or tags out.

pub mod embedding;
pub mod fetch;
pub mod retry;
pub mod tagger;

use thiserror::Error;

pub use embedding::{Embedder, HttpEmbedder};
pub use fetch::{ArticleSource, FetchedArticle, HttpFetcher};
pub use retry::RetryPolicy;
pub use tagger::{EventTagger, HttpTagger};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid request: {0}")]
    Invalid(String),
}

impl ClientError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Status { status, .. } => is_transient_status(*status),
            Self::Malformed(_) | Self::Invalid(_) => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Throttling and server-side failures; worth another attempt.
pub(crate) fn is_transient_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Turn a non-success response into `ClientError::Status`, keeping a short
/// excerpt of the body for diagnostics.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body: crate::core::text::truncate_chars(&body, 300),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Timeout.is_transient());
        assert!(ClientError::Transport("connection refused".into()).is_transient());
        assert!(ClientError::Status { status: 503, body: String::new() }.is_transient());
        assert!(ClientError::Status { status: 429, body: String::new() }.is_transient());

        assert!(!ClientError::Status { status: 400, body: String::new() }.is_transient());
        assert!(!ClientError::Malformed("not a vector".into()).is_transient());
    }
}
