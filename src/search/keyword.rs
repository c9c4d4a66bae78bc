//! Keyword search over article content and tags.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::article::{Article, ScoredArticle};
use crate::error::{NewsError, Result};
use crate::store::{bounded, DocumentStore};

const PHRASE_WEIGHT: f32 = 3.0;
const TERM_WEIGHT: f32 = 1.0;
const TAG_WEIGHT: f32 = 1.0;

/// Lexical relevance of `article` for `keywords`.
///
/// Per keyword: phrase found in content, each of its terms found in content,
/// and a tag equal to the keyword all add to the score. Matching is
/// case-insensitive and on whole words, so "rain" does not hit "training".
pub fn keyword_score(article: &Article, keywords: &[String]) -> f32 {
    let content = words(&article.content);
    let vocabulary: HashSet<&str> = content.iter().map(String::as_str).collect();
    let tags: Vec<String> = article.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut score = 0.0;
    for keyword in keywords {
        let terms = words(keyword);
        if terms.is_empty() {
            continue;
        }

        if content.windows(terms.len()).any(|w| w == terms.as_slice()) {
            score += PHRASE_WEIGHT;
        }
        score += terms
            .iter()
            .filter(|term| vocabulary.contains(term.as_str()))
            .count() as f32
            * TERM_WEIGHT;
        let keyword = keyword.trim().to_lowercase();
        if tags.iter().any(|t| *t == keyword) {
            score += TAG_WEIGHT;
        }
    }
    score
}

/// Lowercased alphanumeric runs.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

pub struct KeywordSearch {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
    default_limit: usize,
}

impl KeywordSearch {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration, default_limit: usize) -> Self {
        Self {
            store,
            timeout,
            default_limit,
        }
    }

    /// Articles matching any keyword, best first. No match is an empty result.
    pub async fn search(
        &self,
        keywords: &[String],
        limit: Option<usize>,
    ) -> Result<Vec<ScoredArticle>> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(NewsError::validation("at least one keyword is required"));
        }

        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(NewsError::validation("limit must be a positive integer"));
        }

        debug!(?keywords, limit, "keyword search");
        let hits = bounded(self.timeout, self.store.keyword_search(&keywords, limit)).await?;
        Ok(hits)
    }
}
