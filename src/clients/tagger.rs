//! Event tagger client
//!
//! The token-classification service answers `POST {url}` / `{"inputs": text}`
//! with tagged spans in the Hugging Face pipeline shape:
//!
//! ```json
//! [{"entity_group": "EVENT", "word": "flooding", "start": 10, "end": 18, "score": 0.97}]
//! ```
//!
//! Only span text matters here; offsets and labels are discarded.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_status, ClientError, RetryPolicy};
use crate::config::TaggerSettings;

#[async_trait]
pub trait EventTagger: Send + Sync {
    async fn tag(&self, text: &str) -> Result<BTreeSet<String>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct TaggedSpan {
    word: String,
    #[serde(default)]
    score: Option<f32>,
}

pub struct HttpTagger {
    http: Client,
    url: String,
    min_score: f32,
    retry: RetryPolicy,
}

impl HttpTagger {
    pub fn new(settings: &TaggerSettings, retry: RetryPolicy) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| ClientError::Invalid(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: settings.url.clone(),
            min_score: settings.min_score,
            retry,
        })
    }

    async fn request(&self, text: &str) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl EventTagger for HttpTagger {
    async fn tag(&self, text: &str) -> Result<BTreeSet<String>, ClientError> {
        let body = self.retry.run("tag", || self.request(text)).await?;
        parse_tag_response(body, self.min_score)
    }
}

/// Collapse spans into a deduplicated tag set.
///
/// Accepts a flat span list or a batch of one (`[[span, ...]]`).
pub fn parse_tag_response(body: Value, min_score: f32) -> Result<BTreeSet<String>, ClientError> {
    let body = match body {
        Value::Array(items) if matches!(items.as_slice(), [Value::Array(_)]) => {
            items.into_iter().next().unwrap_or(Value::Array(Vec::new()))
        }
        other => other,
    };

    let spans: Vec<TaggedSpan> = serde_json::from_value(body)
        .map_err(|e| ClientError::Malformed(format!("unexpected tagger output: {}", e)))?;

    Ok(spans
        .into_iter()
        .filter(|span| span.score.map_or(true, |s| s >= min_score))
        .map(|span| span.word.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|tag| !tag.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spans_dedupes() {
        let body = json!([
            {"entity_group": "EVENT", "word": "flooding", "start": 0, "end": 8, "score": 0.98},
            {"entity_group": "EVENT", "word": " flooding ", "start": 40, "end": 48, "score": 0.91},
            {"entity": "B-EVENT", "word": "general  election", "score": 0.88}
        ]);

        let tags = parse_tag_response(body, 0.0).unwrap();
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["flooding".to_string(), "general election".to_string()]
        );
    }

    #[test]
    fn test_parse_applies_min_score_and_batch_shape() {
        let body = json!([[
            {"word": "haze", "score": 0.4},
            {"word": "election", "score": 0.9},
            {"word": "   "}
        ]]);

        let tags = parse_tag_response(body, 0.5).unwrap();
        assert_eq!(tags, BTreeSet::from(["election".to_string()]));
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(parse_tag_response(json!([]), 0.0).unwrap().is_empty());
        assert!(matches!(
            parse_tag_response(json!({"error": "overloaded"}), 0.0),
            Err(ClientError::Malformed(_))
        ));
    }
}
