//! Elasticsearch-backed document store.
//!
//! One index, one document per article URL. Vectors live in a `dense_vector`
//! field with cosine similarity; Elasticsearch reports kNN hits as
//! `(1 + cos) / 2`, which is converted back to cosine here so both backends
//! return the same score scale.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{CandidateFilter, DocumentStore, KnnQuery, StoreError, StoreResult, StoreStats};
use crate::clients::{check_status, is_transient_status, ClientError, RetryPolicy};
use crate::config::StoreSettings;
use crate::core::article::{Article, Document, Location, ScoredArticle, TagCount};
use crate::search::ranking::rank;

pub const EMBEDDING_FIELD: &str = "article_embedding";
const DATE_FORMAT: &str = "yyyy-MM-dd";
/// Extra kNN hits so score ties at the cut are settled by `rank`, not shard order.
const TIE_SLACK: usize = 10;

/// Stored `_source` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SourceDoc {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    language: String,
    location: Location,
    #[serde(default)]
    site: String,
    date: NaiveDate,
    #[serde(default, rename = "article_embedding", skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indexed_at: Option<i64>,
}

impl SourceDoc {
    fn from_document(doc: &Document) -> Self {
        Self {
            url: doc.url.clone(),
            title: doc.title.clone(),
            content: doc.content.clone(),
            language: doc.language.clone(),
            location: doc.location,
            site: doc.site.clone(),
            date: doc.date,
            embedding: Some(doc.embedding.clone()),
            tags: doc.tags.iter().cloned().collect(),
            indexed_at: Some(chrono::Utc::now().timestamp_millis()),
        }
    }

    fn into_article(self) -> Article {
        Article {
            url: self.url,
            title: self.title,
            content: self.content,
            language: self.language,
            location: self.location,
            site: self.site,
            date: self.date,
            tags: self.tags.into_iter().collect(),
        }
    }

    fn into_document(mut self) -> Document {
        let embedding = self.embedding.take().unwrap_or_default();
        let article = self.into_article();
        Document {
            url: article.url,
            title: article.title,
            content: article.content,
            language: article.language,
            location: article.location,
            site: article.site,
            date: article.date,
            embedding,
            tags: article.tags,
        }
    }
}

pub struct ElasticStore {
    http: Client,
    base: Url,
    index: String,
    dimensions: usize,
    num_candidates: usize,
    credentials: Option<(String, Option<String>)>,
    retry: RetryPolicy,
}

impl ElasticStore {
    pub fn new(
        settings: &StoreSettings,
        dimensions: usize,
        retry: RetryPolicy,
    ) -> StoreResult<Self> {
        let base = Url::parse(&settings.elastic_url).map_err(|e| {
            StoreError::Unreachable(format!("invalid elastic_url '{}': {}", settings.elastic_url, e))
        })?;
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| StoreError::Unreachable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            index: settings.index_name.clone(),
            dimensions,
            num_candidates: settings.num_candidates,
            credentials: settings
                .username
                .clone()
                .map(|user| (user, settings.password.clone())),
            retry,
        })
    }

    /// `{base}/{index}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StoreError::Unreachable(format!("cannot-be-a-base url: {}", self.base)))?;
            path.pop_if_empty().push(&self.index);
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, password.as_deref()),
            None => builder,
        }
    }

    /// Transport errors, 429 and 5xx are retried per the policy. Any other
    /// status is handed back for the caller to interpret.
    async fn send<F>(&self, operation: &str, build: F) -> StoreResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let build = &build;
        self.retry
            .run(operation, || async move {
                let response = build().send().await?;
                if is_transient_status(response.status().as_u16()) {
                    return check_status(response).await;
                }
                Ok(response)
            })
            .await
            .map_err(store_error)
    }

    async fn json_or_reject(response: Response) -> StoreResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, response).await);
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn search(&self, body: Value) -> StoreResult<Value> {
        debug!(index = %self.index, "search: {}", body);
        let url = self.endpoint(&["_search"])?;
        let response = self
            .send("elasticsearch.search", || {
                self.request(Method::POST, url.clone()).json(&body)
            })
            .await?;
        Self::json_or_reject(response).await
    }
}

fn store_error(e: ClientError) -> StoreError {
    match e {
        ClientError::Timeout => {
            StoreError::Unreachable("elasticsearch: request timed out".to_string())
        }
        ClientError::Status { status, body } => StoreError::Rejected { status, body },
        ClientError::Malformed(msg) => StoreError::Malformed(msg),
        ClientError::Transport(msg) | ClientError::Invalid(msg) => {
            StoreError::Unreachable(format!("elasticsearch: {}", msg))
        }
    }
}

async fn rejected(status: StatusCode, response: Response) -> StoreError {
    let body = response.text().await.unwrap_or_default();
    StoreError::Rejected {
        status: status.as_u16(),
        body: body.chars().take(300).collect(),
    }
}

/// Index mapping: lexical text, keyword facets and a cosine `dense_vector`.
pub fn index_mapping(dimensions: usize) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1
        },
        "mappings": {
            "properties": {
                "url": { "type": "keyword" },
                "title": { "type": "text" },
                "content": { "type": "text" },
                "language": { "type": "keyword" },
                "location": { "type": "keyword" },
                "site": { "type": "keyword" },
                "date": { "type": "date", "format": DATE_FORMAT },
                EMBEDDING_FIELD: {
                    "type": "dense_vector",
                    "dims": dimensions,
                    "index": true,
                    "similarity": "cosine"
                },
                "tags": { "type": "keyword" },
                "indexed_at": { "type": "date", "format": "epoch_millis" }
            }
        }
    })
}

fn filter_clause(filter: &CandidateFilter) -> Value {
    match filter {
        CandidateFilter::Site(site) => json!({ "term": { "site": site } }),
        CandidateFilter::DateRange { from, to } => json!({
            "range": {
                "date": {
                    "gte": from.format("%Y-%m-%d").to_string(),
                    "lte": to.format("%Y-%m-%d").to_string(),
                    "format": DATE_FORMAT
                }
            }
        }),
    }
}

/// Cosine as reported by ES for `similarity: cosine` is `(1 + cos) / 2`.
pub fn score_to_cosine(score: f32) -> f32 {
    2.0 * score - 1.0
}

pub fn knn_body(query: &KnnQuery, num_candidates: usize) -> Value {
    let fetch = query.k.saturating_add(TIE_SLACK);
    let mut knn = json!({
        "field": EMBEDDING_FIELD,
        "query_vector": query.vector,
        "k": fetch,
        "num_candidates": num_candidates.max(fetch),
        "filter": {
            "bool": {
                "filter": [filter_clause(&query.filter)],
                "must_not": [{ "term": { "url": query.exclude_url } }]
            }
        }
    });
    if let Some(min) = query.min_score {
        // kNN `similarity` takes the raw cosine for this metric
        knn["similarity"] = json!(min);
    }

    json!({
        "knn": knn,
        "size": fetch,
        "_source": { "excludes": [EMBEDDING_FIELD] }
    })
}

pub fn tag_counts_body(from: NaiveDate, to: NaiveDate, limit: usize) -> Value {
    json!({
        "size": 0,
        "query": filter_clause(&CandidateFilter::DateRange { from, to }),
        "aggs": {
            "tags": {
                "terms": {
                    "field": "tags",
                    "size": limit,
                    "order": [{ "_count": "desc" }, { "_key": "asc" }]
                }
            }
        }
    })
}

pub fn keyword_body(keywords: &[String], limit: usize) -> Value {
    let should: Vec<Value> = keywords
        .iter()
        .flat_map(|kw| {
            [
                json!({ "match_phrase": { "content": { "query": kw, "boost": 3 } } }),
                json!({ "match": { "content": { "query": kw, "fuzziness": "AUTO" } } }),
                json!({
                    "term": { "tags": { "value": kw, "boost": 1, "case_insensitive": true } }
                }),
            ]
        })
        .collect();

    json!({
        "size": limit,
        "query": {
            "bool": {
                "should": should,
                "minimum_should_match": 1,
                "filter": [{ "exists": { "field": EMBEDDING_FIELD } }]
            }
        },
        "_source": { "excludes": [EMBEDDING_FIELD] }
    })
}

fn stats_body() -> Value {
    json!({
        "size": 0,
        "track_total_hits": true,
        "aggs": {
            "with_embedding": { "filter": { "exists": { "field": EMBEDDING_FIELD } } },
            "distinct_tags": { "cardinality": { "field": "tags" } },
            "earliest": { "min": { "field": "date", "format": DATE_FORMAT } },
            "latest": { "max": { "field": "date", "format": DATE_FORMAT } },
            "last_indexed": { "max": { "field": "indexed_at" } }
        }
    })
}

/// Map `hits.hits` into scored articles, applying `to_score` to `_score`.
pub fn parse_hits(body: &Value, to_score: impl Fn(f32) -> f32) -> StoreResult<Vec<ScoredArticle>> {
    let hits = body["hits"]["hits"]
        .as_array()
        .ok_or_else(|| StoreError::Malformed("search response without hits".to_string()))?;

    hits.iter()
        .map(|hit| {
            let source: SourceDoc = serde_json::from_value(hit["_source"].clone())?;
            let raw = hit["_score"].as_f64().unwrap_or(0.0) as f32;
            Ok(ScoredArticle {
                article: source.into_article(),
                score: to_score(raw),
            })
        })
        .collect()
}

/// Cosine-scored kNN hits without the seed, ranked and cut to `k`.
fn nearest_hits(body: &Value, query: &KnnQuery) -> StoreResult<Vec<ScoredArticle>> {
    let mut hits = parse_hits(body, score_to_cosine)?;
    hits.retain(|hit| hit.article.url != query.exclude_url);
    rank(&mut hits, query.k);
    Ok(hits)
}

pub fn parse_tag_buckets(body: &Value) -> StoreResult<Vec<TagCount>> {
    let buckets = body["aggregations"]["tags"]["buckets"]
        .as_array()
        .ok_or_else(|| StoreError::Malformed("aggregation response without buckets".to_string()))?;

    buckets
        .iter()
        .map(|bucket| {
            let tag = bucket["key"]
                .as_str()
                .ok_or_else(|| StoreError::Malformed("bucket key is not a string".to_string()))?;
            let count = bucket["doc_count"]
                .as_u64()
                .ok_or_else(|| StoreError::Malformed("bucket without doc_count".to_string()))?;
            Ok(TagCount::new(tag, count))
        })
        .collect()
}

fn parse_stats(body: &Value) -> StoreStats {
    let aggs = &body["aggregations"];
    let as_date = |v: &Value| {
        v["value_as_string"]
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    };

    StoreStats {
        document_count: body["hits"]["total"]["value"].as_u64().unwrap_or(0) as usize,
        embedding_count: aggs["with_embedding"]["doc_count"].as_u64().unwrap_or(0) as usize,
        distinct_tags: aggs["distinct_tags"]["value"].as_u64().unwrap_or(0) as usize,
        earliest_date: as_date(&aggs["earliest"]),
        latest_date: as_date(&aggs["latest"]),
        last_indexed: aggs["last_indexed"]["value"]
            .as_f64()
            .map(|ms| (ms / 1000.0) as i64),
    }
}

#[async_trait]
impl DocumentStore for ElasticStore {
    async fn ensure_index(&self) -> StoreResult<bool> {
        let url = self.endpoint(&[])?;
        let head = self
            .send("elasticsearch.head", || self.request(Method::HEAD, url.clone()))
            .await?;
        if head.status().is_success() {
            return Ok(false);
        }
        if head.status() != StatusCode::NOT_FOUND {
            return Err(rejected(head.status(), head).await);
        }

        let mapping = index_mapping(self.dimensions);
        let response = self
            .send("elasticsearch.create_index", || {
                self.request(Method::PUT, url.clone()).json(&mapping)
            })
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }

        match rejected(status, response).await {
            // Lost a creation race with another writer
            StoreError::Rejected { body, .. } if body.contains("resource_already_exists") => {
                Ok(false)
            }
            err => Err(err),
        }
    }

    async fn upsert(&self, doc: &Document) -> StoreResult<()> {
        if doc.embedding.len() != self.dimensions {
            return Err(StoreError::Schema(format!(
                "document {} has a {}-dimensional vector, index expects {}",
                doc.url,
                doc.embedding.len(),
                self.dimensions
            )));
        }

        let mut url = self.endpoint(&["_doc", doc.url.as_str()])?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");

        // A single index request replaces the whole source.
        let source = SourceDoc::from_document(doc);
        let response = self
            .send("elasticsearch.index", || {
                self.request(Method::PUT, url.clone()).json(&source)
            })
            .await?;
        Self::json_or_reject(response).await.map(|_| ())
    }

    async fn get(&self, url: &str) -> StoreResult<Option<Document>> {
        let endpoint = self.endpoint(&["_doc", url])?;
        let response = self
            .send("elasticsearch.get", || self.request(Method::GET, endpoint.clone()))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = Self::json_or_reject(response).await?;
        if body["found"].as_bool() == Some(false) {
            return Ok(None);
        }
        let source: SourceDoc = serde_json::from_value(body["_source"].clone())?;
        Ok(Some(source.into_document()))
    }

    async fn nearest(&self, query: &KnnQuery) -> StoreResult<Vec<ScoredArticle>> {
        let body = self.search(knn_body(query, self.num_candidates)).await?;
        nearest_hits(&body, query)
    }

    async fn tag_counts(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> StoreResult<Vec<TagCount>> {
        let body = self.search(tag_counts_body(from, to, limit)).await?;
        parse_tag_buckets(&body)
    }

    async fn keyword_search(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> StoreResult<Vec<ScoredArticle>> {
        let body = self.search(keyword_body(keywords, limit)).await?;
        let mut hits = parse_hits(&body, |s| s)?;
        rank(&mut hits, limit);
        Ok(hits)
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        let body = self.search(stats_body()).await?;
        Ok(parse_stats(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> ElasticStore {
        let settings = StoreSettings {
            elastic_url: "http://localhost:9200/".to_string(),
            index_name: "articles".to_string(),
            ..StoreSettings::default()
        };
        ElasticStore::new(&settings, 3, RetryPolicy::default()).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_document_id() {
        let url = store()
            .endpoint(&["_doc", "https://www.straitstimes.com/a?b=1"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9200/articles/_doc/https:%2F%2Fwww.straitstimes.com%2Fa%3Fb=1"
        );
    }

    #[test]
    fn test_client_errors_map_to_store_errors() {
        assert!(matches!(
            store_error(ClientError::Timeout),
            StoreError::Unreachable(_)
        ));
        assert!(matches!(
            store_error(ClientError::Transport("connection refused".into())),
            StoreError::Unreachable(_)
        ));
        assert!(matches!(
            store_error(ClientError::Status { status: 503, body: "busy".into() }),
            StoreError::Rejected { status: 503, .. }
        ));
        assert!(matches!(
            store_error(ClientError::Malformed("eof".into())),
            StoreError::Malformed(_)
        ));

        // retried inside `send`; other statuses reach the caller untouched
        assert!(is_transient_status(429));
        assert!(is_transient_status(502));
        assert!(!is_transient_status(404));
        assert!(!is_transient_status(400));
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_retried_then_fails() {
        let settings = StoreSettings {
            // nothing listens on the discard port
            elastic_url: "http://127.0.0.1:9/".to_string(),
            timeout_ms: 500,
            ..StoreSettings::default()
        };
        let retry = RetryPolicy {
            max_attempts: 3,
            initial_backoff: std::time::Duration::from_millis(20),
            max_backoff: std::time::Duration::from_millis(20),
        };
        let store = ElasticStore::new(&settings, 3, retry).unwrap();

        let started = std::time::Instant::now();
        let result = store.ensure_index().await;
        assert!(matches!(result, Err(StoreError::Unreachable(_))));
        // two backoff sleeps between three attempts
        assert!(started.elapsed() >= std::time::Duration::from_millis(40));
    }

    #[test]
    fn test_mapping_declares_vector_field() {
        let mapping = index_mapping(768);
        let field = &mapping["mappings"]["properties"][EMBEDDING_FIELD];
        assert_eq!(field["type"], "dense_vector");
        assert_eq!(field["dims"], 768);
        assert_eq!(field["similarity"], "cosine");
        assert_eq!(mapping["mappings"]["properties"]["date"]["format"], "yyyy-MM-dd");
    }

    #[test]
    fn test_knn_body_with_date_filter() {
        let query = KnnQuery {
            vector: vec![0.1, 0.2, 0.3],
            filter: CandidateFilter::DateRange {
                from: ymd(2024, 1, 2),
                to: ymd(2024, 3, 2),
            },
            exclude_url: "https://example.com/seed".to_string(),
            k: 5,
            min_score: Some(0.75),
        };

        let body = knn_body(&query, 100);
        assert_eq!(body["knn"]["field"], EMBEDDING_FIELD);
        assert_eq!(body["knn"]["k"], 15);
        assert_eq!(body["size"], 15);
        assert_eq!(body["knn"]["num_candidates"], 100);
        assert_eq!(body["knn"]["similarity"], 0.75);
        assert_eq!(
            body["knn"]["filter"]["bool"]["filter"][0]["range"]["date"]["gte"],
            "2024-01-02"
        );
        assert_eq!(
            body["knn"]["filter"]["bool"]["must_not"][0]["term"]["url"],
            "https://example.com/seed"
        );
        assert_eq!(body["_source"]["excludes"][0], EMBEDDING_FIELD);
    }

    #[test]
    fn test_nearest_hits_break_ties_past_the_cut() {
        // Cluster order among equal scores is arbitrary; here it is url-desc.
        let hit = |url: &str, date: &str| {
            json!({
                "_score": 0.95,
                "_source": {
                    "url": url, "title": "", "content": "x", "language": "en",
                    "location": "Singapore", "site": "straitstimes", "date": date, "tags": []
                }
            })
        };
        let body = json!({ "hits": { "hits": [
            hit("seed", "2024-02-01"),
            hit("c", "2024-02-01"),
            hit("b", "2024-02-03"),
            hit("a", "2024-02-01"),
        ] } });
        let query = KnnQuery {
            vector: vec![1.0, 0.0, 0.0],
            filter: CandidateFilter::Site("straitstimes".to_string()),
            exclude_url: "seed".to_string(),
            k: 2,
            min_score: None,
        };

        let hits = nearest_hits(&body, &query).unwrap();
        let urls: Vec<&str> = hits.iter().map(|h| h.article.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a"]);
        assert!((hits[0].score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_knn_body_site_filter_and_candidate_floor() {
        let query = KnnQuery {
            vector: vec![1.0, 0.0, 0.0],
            filter: CandidateFilter::Site("channelnewsasia".to_string()),
            exclude_url: "seed".to_string(),
            k: 200,
            min_score: None,
        };

        let body = knn_body(&query, 100);
        assert_eq!(body["knn"]["num_candidates"], 210);
        assert!(body["knn"].get("similarity").is_none());
        assert_eq!(
            body["knn"]["filter"]["bool"]["filter"][0]["term"]["site"],
            "channelnewsasia"
        );
    }

    #[test]
    fn test_tag_aggregation_body_orders_by_count_then_key() {
        let body = tag_counts_body(ymd(2024, 2, 1), ymd(2024, 2, 29), 1000);
        assert_eq!(body["size"], 0);
        assert_eq!(body["aggs"]["tags"]["terms"]["size"], 1000);
        assert_eq!(
            body["aggs"]["tags"]["terms"]["order"],
            json!([{ "_count": "desc" }, { "_key": "asc" }])
        );
        assert_eq!(body["query"]["range"]["date"]["lte"], "2024-02-29");
    }

    #[test]
    fn test_parse_hits_converts_score() {
        let body = json!({
            "hits": { "hits": [
                {
                    "_score": 0.95,
                    "_source": {
                        "url": "https://example.com/a2",
                        "title": "Floods",
                        "content": "Floods in Johor",
                        "language": "en",
                        "location": "Malaysia",
                        "site": "thestar",
                        "date": "2024-02-03",
                        "tags": ["flooding"]
                    }
                }
            ]}
        });

        let hits = parse_hits(&body, score_to_cosine).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 0.9).abs() < 1e-6);
        assert_eq!(hits[0].article.location, Location::Malaysia);
        assert!(hits[0].article.tags.contains("flooding"));

        assert!(matches!(
            parse_hits(&json!({"error": "boom"}), score_to_cosine),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_tag_buckets() {
        let body = json!({
            "aggregations": { "tags": { "buckets": [
                { "key": "flooding", "doc_count": 3 },
                { "key": "haze", "doc_count": 1 }
            ]}}
        });
        assert_eq!(
            parse_tag_buckets(&body).unwrap(),
            vec![TagCount::new("flooding", 3), TagCount::new("haze", 1)]
        );
    }

    #[test]
    fn test_parse_stats() {
        let body = json!({
            "hits": { "total": { "value": 4, "relation": "eq" }, "hits": [] },
            "aggregations": {
                "with_embedding": { "doc_count": 3 },
                "distinct_tags": { "value": 7 },
                "earliest": { "value": 1.7e12, "value_as_string": "2024-01-05" },
                "latest": { "value": 1.7e12, "value_as_string": "2024-02-20" },
                "last_indexed": { "value": 1707000000000.0 }
            }
        });

        let stats = parse_stats(&body);
        assert_eq!(stats.document_count, 4);
        assert_eq!(stats.embedding_count, 3);
        assert_eq!(stats.distinct_tags, 7);
        assert_eq!(stats.earliest_date, Some(ymd(2024, 1, 5)));
        assert_eq!(stats.latest_date, Some(ymd(2024, 2, 20)));
        assert_eq!(stats.last_indexed, Some(1_707_000_000));
    }

    #[test]
    fn test_keyword_body_shape() {
        let body = keyword_body(&["banjir".to_string()], 10);
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 3);
        assert_eq!(should[0]["match_phrase"]["content"]["boost"], 3);
        // tags compare like the sqlite backend: whole value, any case
        assert_eq!(should[2]["term"]["tags"]["case_insensitive"], true);
        assert_eq!(body["size"], 10);
    }
}
