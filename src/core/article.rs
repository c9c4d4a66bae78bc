use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::NewsError;

/// Country an article is filed under. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    Singapore,
    Malaysia,
    Indonesia,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singapore => "Singapore",
            Self::Malaysia => "Malaysia",
            Self::Indonesia => "Indonesia",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "singapore" | "sg" => Ok(Self::Singapore),
            "malaysia" | "my" => Ok(Self::Malaysia),
            "indonesia" | "id" => Ok(Self::Indonesia),
            _ => Err(NewsError::validation(format!(
                "invalid location '{}' (must be: Singapore|Malaysia|Indonesia)",
                s
            ))),
        }
    }
}

/// Raw ingestion request: a URL plus whatever the caller already extracted.
///
/// Structured fields are kept as strings here; the pipeline validates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ArticleInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// True when the body has to be fetched from `url`.
    pub fn needs_fetch(&self) -> bool {
        self.content
            .as_deref()
            .map_or(true, |c| c.trim().is_empty())
    }
}

/// The indexed record for one article, keyed by `url`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub content: String,
    pub language: String,
    pub location: Location,
    pub site: String,
    pub date: NaiveDate,
    /// Empty means ingestion never completed; such records are not searchable.
    pub embedding: Vec<f32>,
    pub tags: BTreeSet<String>,
}

impl Document {
    /// Response view of the document. Never carries the embedding.
    pub fn to_article(&self) -> Article {
        Article {
            url: self.url.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            language: self.language.clone(),
            location: self.location,
            site: self.site.clone(),
            date: self.date,
            tags: self.tags.clone(),
        }
    }

    pub fn is_searchable(&self) -> bool {
        !self.embedding.is_empty()
    }
}

/// Article as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub content: String,
    pub language: String,
    pub location: Location,
    pub site: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// An article with its similarity (or keyword relevance) score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

impl TagCount {
    pub fn new(tag: impl Into<String>, count: u64) -> Self {
        Self {
            tag: tag.into(),
            count,
        }
    }
}

/// Non-fatal conditions recorded while ingesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestWarning {
    /// Tag extraction failed; the article was indexed without tags.
    TaggingDegraded { reason: String },
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaggingDegraded { reason } => {
                write!(f, "indexed without tags (tagging failed: {})", reason)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub article: Article,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<IngestWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parsing() {
        assert_eq!("Singapore".parse::<Location>().unwrap(), Location::Singapore);
        assert_eq!(" malaysia ".parse::<Location>().unwrap(), Location::Malaysia);
        assert_eq!("ID".parse::<Location>().unwrap(), Location::Indonesia);
        assert!(matches!(
            "Thailand".parse::<Location>(),
            Err(NewsError::Validation(_))
        ));
    }

    #[test]
    fn test_article_view_drops_embedding() {
        let doc = Document {
            url: "https://example.com/a1".to_string(),
            title: "Flash floods".to_string(),
            content: "Flash floods hit Bedok".to_string(),
            language: "en".to_string(),
            location: Location::Singapore,
            site: "straitstimes".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            embedding: vec![0.5; 8],
            tags: BTreeSet::from(["flooding".to_string()]),
        };

        let json = serde_json::to_value(doc.to_article()).unwrap();
        assert!(json.get("embedding").is_none());
        assert_eq!(json["date"], "2024-02-01");
        assert_eq!(json["location"], "Singapore");
        assert_eq!(json["tags"], serde_json::json!(["flooding"]));
    }

    #[test]
    fn test_needs_fetch() {
        let mut input = ArticleInput::new("https://example.com/a");
        assert!(input.needs_fetch());
        input.content = Some("  ".to_string());
        assert!(input.needs_fetch());
        input.content = Some("Body".to_string());
        assert!(!input.needs_fetch());
    }
}
