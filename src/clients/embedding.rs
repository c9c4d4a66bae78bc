//! Bi-encoder embedding client
//!
//! Talks to a text-embeddings-inference style service:
//! `POST {url}` with `{"inputs": "<text>"}`, answered by either a bare vector
//! `[f32; D]` or a batch of one `[[f32; D]]`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{check_status, ClientError, RetryPolicy};
use crate::config::EmbeddingSettings;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimensionality D every returned vector must have.
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ClientError>;
}

pub struct HttpEmbedder {
    http: Client,
    url: String,
    dimensions: usize,
    retry: RetryPolicy,
}

impl HttpEmbedder {
    pub fn new(settings: &EmbeddingSettings, retry: RetryPolicy) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| ClientError::Invalid(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: settings.url.clone(),
            dimensions: settings.dimensions,
            retry,
        })
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;
        let body: Value = check_status(response).await?.json().await?;
        parse_embedding_response(body)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ClientError> {
        let embedding = self.retry.run("embed", || self.request(text)).await?;
        check_embedding(&embedding, self.dimensions)?;
        Ok(embedding)
    }
}

/// Accept `[f32]` or `[[f32]]` (single-item batch).
pub fn parse_embedding_response(body: Value) -> Result<Vec<f32>, ClientError> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(ClientError::Malformed(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )))
        }
    };

    let items = match items.as_slice() {
        [Value::Array(inner)] => inner.clone(),
        _ => items,
    };

    items
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|x| x as f32)
                .ok_or_else(|| ClientError::Malformed(format!("non-numeric component {}", v)))
        })
        .collect()
}

/// Reject vectors of the wrong length or with non-finite components.
pub fn check_embedding(embedding: &[f32], dimensions: usize) -> Result<(), ClientError> {
    if embedding.len() != dimensions {
        return Err(ClientError::Malformed(format!(
            "expected {}-dimensional vector, got {}",
            dimensions,
            embedding.len()
        )));
    }
    if embedding.iter().any(|x| !x.is_finite()) {
        return Err(ClientError::Malformed(
            "vector contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
