//! Article fetching for URLs ingested without pre-extracted content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::{Html, Selector};
use url::Url;

use super::{check_status, ClientError, RetryPolicy};
use crate::config::FetchSettings;
use crate::core::text::{normalize_whitespace, truncate_chars};

/// Fields recovered from an article page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedArticle {
    pub title: Option<String>,
    pub content: String,
    pub language: Option<String>,
    /// Raw `article:published_time` (or similar) meta value.
    pub published: Option<String>,
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, ClientError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
    max_chars: usize,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings, retry: RetryPolicy) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .gzip(true)
            .redirect(Policy::limited(settings.max_redirects))
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| ClientError::Invalid(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            max_chars: settings.max_chars,
            retry,
        })
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, ClientError> {
        let response = check_status(self.http.get(url.clone()).send().await?).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if !content_type.starts_with("text/html") {
            return Err(ClientError::Invalid(format!(
                "content-type not html: {}",
                content_type
            )));
        }

        let body = response.bytes().await?;
        Ok(String::from_utf8_lossy(&body).to_string())
    }
}

#[async_trait]
impl ArticleSource for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, ClientError> {
        if !(url.scheme() == "https" || url.scheme() == "http") {
            return Err(ClientError::Invalid(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        let html = self.retry.run("fetch", || self.fetch_html(url)).await?;
        let mut article = extract_article(&html);
        article.content = truncate_chars(&article.content, self.max_chars);
        Ok(article)
    }
}

fn select_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn select_text(doc: &Html, selector: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };
    doc.select(&sel)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Pull title, body text, language and publication time out of a page.
///
/// Body text prefers `<p>` elements inside `<article>`, then any `<p>`, then
/// the whole `<body>`.
pub fn extract_article(html: &str) -> FetchedArticle {
    let doc = Html::parse_document(html);

    let title = select_attr(&doc, r#"meta[property="og:title"]"#, "content")
        .or_else(|| select_text(&doc, "title").into_iter().next());

    let mut paragraphs = select_text(&doc, "article p");
    if paragraphs.is_empty() {
        paragraphs = select_text(&doc, "p");
    }
    if paragraphs.is_empty() {
        paragraphs = select_text(&doc, "body");
    }

    let language = select_attr(&doc, "html", "lang")
        .map(|l| l.split(['-', '_']).next().unwrap_or("").to_lowercase())
        .filter(|l| !l.is_empty());

    let published = select_attr(&doc, r#"meta[property="article:published_time"]"#, "content")
        .or_else(|| select_attr(&doc, r#"meta[name="pubdate"]"#, "content"))
        .or_else(|| select_attr(&doc, "time[datetime]", "datetime"));

    FetchedArticle {
        title,
        content: paragraphs.join(" "),
        language,
        published,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html lang="ms-MY">
<head>
  <title>Banjir di Johor | Astro Awani</title>
  <meta property="og:title" content="Banjir di Johor">
  <meta property="article:published_time" content="2024-02-01T08:00:00+08:00">
  <script>var tracking = 1;</script>
</head>
<body>
  <nav><p>Menu</p></nav>
  <article>
    <p>Hujan lebat   menyebabkan banjir.</p>
    <p>Lebih 500 mangsa dipindahkan.</p>
  </article>
</body>
</html>"#;

    #[test]
    fn test_extract_article_fields() {
        let article = extract_article(PAGE);
        assert_eq!(article.title.as_deref(), Some("Banjir di Johor"));
        assert_eq!(
            article.content,
            "Hujan lebat menyebabkan banjir. Lebih 500 mangsa dipindahkan."
        );
        assert_eq!(article.language.as_deref(), Some("ms"));
        assert_eq!(
            article.published.as_deref(),
            Some("2024-02-01T08:00:00+08:00")
        );
    }

    #[test]
    fn test_extract_falls_back_to_body() {
        let article = extract_article("<html><body><div>Only   text here</div></body></html>");
        assert_eq!(article.title, None);
        assert_eq!(article.content, "Only text here");
        assert_eq!(article.language, None);
    }
}
