//! Similarity queries anchored on an indexed seed article.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimilaritySettings;
use crate::core::article::{Document, ScoredArticle};
use crate::core::date::parse_date;
use crate::error::{NewsError, Result};
use crate::search::ranking::rank;
use crate::store::{bounded, CandidateFilter, DocumentStore, KnnQuery};

/// The single structured dimension a similarity query is restricted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Site,
    Date,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site => f.write_str("site"),
            Self::Date => f.write_str("date"),
        }
    }
}

impl FromStr for FilterKind {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "site" => Ok(Self::Site),
            "date" => Ok(Self::Date),
            other => Err(NewsError::validation(format!(
                "invalid filter '{}' (must be: site|date)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarRequest {
    pub seed_url: String,
    pub filter: FilterKind,
    /// Site name or anchor date overriding the seed's own value.
    #[serde(default)]
    pub filter_value: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Half-width of the date window; configuration default when absent.
    #[serde(default)]
    pub window_days: Option<i64>,
}

impl SimilarRequest {
    pub fn new(seed_url: impl Into<String>, filter: FilterKind) -> Self {
        Self {
            seed_url: seed_url.into(),
            filter,
            filter_value: None,
            top_k: None,
            window_days: None,
        }
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn filter_value(mut self, value: impl Into<String>) -> Self {
        self.filter_value = Some(value.into());
        self
    }
}

/// Four-digit years only; stores compare `YYYY-MM-DD` text and parse it strictly.
fn calendar_bounds() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX),
    )
}

/// Inclusive `[anchor - days, anchor + days]`, clamped to years 0001..=9999.
pub fn date_window(anchor: NaiveDate, days: i64) -> Result<(NaiveDate, NaiveDate)> {
    check_window(days)?;
    let (first, last) = calendar_bounds();
    let span = Days::new(days as u64);
    let from = anchor
        .checked_sub_days(span)
        .map_or(first, |d| d.max(first));
    let to = anchor.checked_add_days(span).map_or(last, |d| d.min(last));
    Ok((from, to))
}

fn check_window(days: i64) -> Result<()> {
    if days <= 0 {
        return Err(NewsError::validation("window_days must be a positive integer"));
    }
    Ok(())
}

pub struct SimilarityService {
    store: Arc<dyn DocumentStore>,
    settings: SimilaritySettings,
    timeout: Duration,
}

impl SimilarityService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        settings: SimilaritySettings,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            settings,
            timeout,
        }
    }

    fn resolve_top_k(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            Some(0) => Err(NewsError::validation("top_k must be a positive integer")),
            Some(k) => Ok(k.min(self.settings.max_top_k)),
            None => Ok(self.settings.default_top_k),
        }
    }

    fn candidate_filter(&self, request: &SimilarRequest, seed: &Document) -> Result<CandidateFilter> {
        let value = request
            .filter_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match request.filter {
            FilterKind::Site => Ok(CandidateFilter::Site(
                value.map(str::to_string).unwrap_or_else(|| seed.site.clone()),
            )),
            FilterKind::Date => {
                let anchor = match value {
                    Some(raw) => parse_date(raw)?,
                    None => seed.date,
                };
                let days = request.window_days.unwrap_or(self.settings.date_window_days);
                let (from, to) = date_window(anchor, days)?;
                Ok(CandidateFilter::DateRange { from, to })
            }
        }
    }

    /// Articles most similar to the seed within one filter dimension.
    ///
    /// Ordered by cosine desc, then date desc, then url asc. The seed never
    /// appears in its own results; an empty result is not an error.
    pub async fn similar(&self, request: &SimilarRequest) -> Result<Vec<ScoredArticle>> {
        let seed_url = request.seed_url.trim();
        if seed_url.is_empty() {
            return Err(NewsError::validation("seed_url is required"));
        }
        let k = self.resolve_top_k(request.top_k)?;
        if let Some(days) = request.window_days {
            check_window(days)?;
        }

        let seed = bounded(self.timeout, self.store.get(seed_url))
            .await?
            .filter(Document::is_searchable)
            .ok_or_else(|| NewsError::NotFound(seed_url.to_string()))?;

        let filter = self.candidate_filter(request, &seed)?;
        debug!(seed = %seed.url, ?filter, k, "similarity query");

        let query = KnnQuery {
            vector: seed.embedding.clone(),
            filter: filter.clone(),
            exclude_url: seed.url.clone(),
            k,
            min_score: self.settings.min_score,
        };
        let mut hits = bounded(self.timeout, self.store.nearest(&query)).await?;

        hits.retain(|hit| hit.article.url != seed.url && filter.admits(&hit.article));
        rank(&mut hits, k);
        Ok(hits)
    }
}
