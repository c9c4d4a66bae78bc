//! Document store using SQLite
//!
//! Stores embeddings as BLOBs and computes similarity in Rust. Tags live in
//! their own table so aggregation is a single GROUP BY.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{CandidateFilter, DocumentStore, KnnQuery, StoreError, StoreResult, StoreStats};
use crate::core::article::{Article, Document, Location, ScoredArticle, TagCount};
use crate::search::keyword::keyword_score;
use crate::search::ranking::{cosine_similarity, rank};

const DIMS_KEY: &str = "embedding_dims";
const DATE_FMT: &str = "%Y-%m-%d";

const ARTICLE_COLUMNS: &str =
    "a.url, a.title, a.content, a.language, a.location, a.site, a.date, a.tags";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    dimensions: usize,
}

impl SqliteStore {
    /// Open or create the database at `db_path` for `dimensions`-wide vectors.
    pub fn open(db_path: &Path, dimensions: usize) -> StoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Unreachable(format!("{}: {}", parent.display(), e)))?;
            }
        }
        Self::from_connection(Connection::open(db_path)?, dimensions)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory(dimensions: usize) -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, dimensions)
    }

    fn from_connection(conn: Connection, dimensions: usize) -> StoreResult<Self> {
        init_schema(&conn)?;
        check_dimensions(&conn, dimensions)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            dimensions,
        })
    }

    /// Run blocking SQLite work off the async executor.
    async fn with_conn<T, F>(&self, work: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unreachable("sqlite connection poisoned".to_string()))?;
            work(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unreachable(format!("sqlite worker failed: {}", e)))?
    }
}

fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS articles (
            url TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            language TEXT NOT NULL,
            location TEXT NOT NULL,
            site TEXT NOT NULL,
            date TEXT NOT NULL,  -- ISO yyyy-mm-dd, sorts lexically
            tags TEXT NOT NULL,  -- JSON array
            indexed_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS embeddings (
            url TEXT PRIMARY KEY,
            embedding BLOB NOT NULL,
            FOREIGN KEY (url) REFERENCES articles(url) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS article_tags (
            url TEXT NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (url, tag),
            FOREIGN KEY (url) REFERENCES articles(url) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS index_meta (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_articles_site ON articles(site);
        CREATE INDEX IF NOT EXISTS idx_articles_date ON articles(date);
        CREATE INDEX IF NOT EXISTS idx_article_tags_tag ON article_tags(tag);
        "#,
    )?;
    Ok(())
}

fn stored_dimensions(conn: &Connection) -> StoreResult<Option<usize>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM index_meta WHERE key = ?1",
            params![DIMS_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value
        .map(|v| {
            v.parse::<usize>()
                .map_err(|_| StoreError::Schema(format!("bad {} value '{}'", DIMS_KEY, v)))
        })
        .transpose()
}

fn check_dimensions(conn: &Connection, dimensions: usize) -> StoreResult<()> {
    match stored_dimensions(conn)? {
        Some(existing) if existing != dimensions => Err(StoreError::Schema(format!(
            "index holds {}-dimensional vectors but {} were configured; reindex required",
            existing, dimensions
        ))),
        _ => Ok(()),
    }
}

fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn date_from_sql(raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Map the leading `ARTICLE_COLUMNS` of a row.
fn row_to_article(row: &Row<'_>) -> rusqlite::Result<Article> {
    let location: String = row.get(4)?;
    let location = location.parse::<Location>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let date: String = row.get(6)?;
    let tags_json: String = row.get(7)?;
    let tags: BTreeSet<String> = serde_json::from_str(&tags_json).unwrap_or_default();

    Ok(Article {
        url: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        language: row.get(3)?,
        location,
        site: row.get(5)?,
        date: date_from_sql(&date)?,
        tags,
    })
}

fn upsert_document(conn: &mut Connection, doc: &Document) -> StoreResult<()> {
    let tags_json = serde_json::to_string(&doc.tags)?;
    let embedding_blob = embedding_to_blob(&doc.embedding);
    let now = chrono::Utc::now().timestamp();

    // Fields, embedding and tags land together or not at all.
    let tx = conn.transaction()?;

    tx.execute(
        r#"
        INSERT INTO articles (url, title, content, language, location, site, date, tags, indexed_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(url) DO UPDATE SET
            title = excluded.title,
            content = excluded.content,
            language = excluded.language,
            location = excluded.location,
            site = excluded.site,
            date = excluded.date,
            tags = excluded.tags,
            indexed_at = excluded.indexed_at
        "#,
        params![
            doc.url,
            doc.title,
            doc.content,
            doc.language,
            doc.location.as_str(),
            doc.site,
            date_to_sql(doc.date),
            tags_json,
            now,
        ],
    )?;

    tx.execute(
        r#"
        INSERT INTO embeddings (url, embedding)
        VALUES (?1, ?2)
        ON CONFLICT(url) DO UPDATE SET embedding = excluded.embedding
        "#,
        params![doc.url, embedding_blob],
    )?;

    tx.execute("DELETE FROM article_tags WHERE url = ?1", params![doc.url])?;
    {
        let mut stmt = tx.prepare("INSERT INTO article_tags (url, tag) VALUES (?1, ?2)")?;
        for tag in &doc.tags {
            stmt.execute(params![doc.url, tag])?;
        }
    }

    tx.commit()?;
    Ok(())
}

fn get_document(conn: &Connection, url: &str) -> StoreResult<Option<Document>> {
    let sql = format!(
        "SELECT {}, e.embedding FROM articles a LEFT JOIN embeddings e ON a.url = e.url WHERE a.url = ?1",
        ARTICLE_COLUMNS
    );
    let found = conn
        .query_row(&sql, params![url], |row| {
            let article = row_to_article(row)?;
            let blob: Option<Vec<u8>> = row.get(8)?;
            Ok((article, blob))
        })
        .optional()?;

    Ok(found.map(|(article, blob)| Document {
        url: article.url,
        title: article.title,
        content: article.content,
        language: article.language,
        location: article.location,
        site: article.site,
        date: article.date,
        embedding: blob.map(|b| blob_to_embedding(&b)).unwrap_or_default(),
        tags: article.tags,
    }))
}

fn nearest_documents(conn: &Connection, query: &KnnQuery) -> StoreResult<Vec<ScoredArticle>> {
    // O(n) over the filtered subset; the JOIN drops records without a vector.
    let base = format!(
        "SELECT {}, e.embedding FROM articles a JOIN embeddings e ON a.url = e.url WHERE a.url <> ?1",
        ARTICLE_COLUMNS
    );

    let mut candidates: Vec<(Article, Vec<u8>)> = Vec::new();
    let mut collect = |row: &Row<'_>| -> rusqlite::Result<()> {
        candidates.push((row_to_article(row)?, row.get(8)?));
        Ok(())
    };

    match &query.filter {
        CandidateFilter::Site(site) => {
            let mut stmt = conn.prepare(&format!("{} AND a.site = ?2", base))?;
            let mut rows = stmt.query(params![query.exclude_url, site])?;
            while let Some(row) = rows.next()? {
                collect(row)?;
            }
        }
        CandidateFilter::DateRange { from, to } => {
            let mut stmt = conn.prepare(&format!("{} AND a.date BETWEEN ?2 AND ?3", base))?;
            let mut rows =
                stmt.query(params![query.exclude_url, date_to_sql(*from), date_to_sql(*to)])?;
            while let Some(row) = rows.next()? {
                collect(row)?;
            }
        }
    }

    let mut results: Vec<ScoredArticle> = candidates
        .into_iter()
        .map(|(article, blob)| {
            let score = cosine_similarity(&query.vector, &blob_to_embedding(&blob));
            ScoredArticle { article, score }
        })
        .filter(|hit| query.min_score.map_or(true, |min| hit.score >= min))
        .collect();

    rank(&mut results, query.k);
    Ok(results)
}

fn count_tags(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
    limit: usize,
) -> StoreResult<Vec<TagCount>> {
    // (url, tag) is the primary key, so COUNT(*) is a per-document count.
    let mut stmt = conn.prepare(
        r#"
        SELECT t.tag, COUNT(*) AS n
        FROM article_tags t
        JOIN articles a ON a.url = t.url
        WHERE a.date BETWEEN ?1 AND ?2
        GROUP BY t.tag
        ORDER BY n DESC, t.tag ASC
        LIMIT ?3
        "#,
    )?;

    let rows = stmt.query_map(
        params![date_to_sql(from), date_to_sql(to), limit as i64],
        |row| {
            let count: i64 = row.get(1)?;
            Ok(TagCount {
                tag: row.get(0)?,
                count: count as u64,
            })
        },
    )?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

fn search_keywords(
    conn: &Connection,
    keywords: &[String],
    limit: usize,
) -> StoreResult<Vec<ScoredArticle>> {
    let sql = format!(
        "SELECT {} FROM articles a JOIN embeddings e ON a.url = e.url",
        ARTICLE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_article)?;

    let mut results = Vec::new();
    for row in rows {
        let article = row?;
        let score = keyword_score(&article, keywords);
        if score > 0.0 {
            results.push(ScoredArticle { article, score });
        }
    }

    rank(&mut results, limit);
    Ok(results)
}

fn collect_stats(conn: &Connection) -> StoreResult<StoreStats> {
    let document_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
    let embedding_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
    let distinct_tags: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT tag) FROM article_tags",
        [],
        |row| row.get(0),
    )?;

    let (earliest, latest, last_indexed): (Option<String>, Option<String>, Option<i64>) = conn
        .query_row(
            "SELECT MIN(date), MAX(date), MAX(indexed_at) FROM articles",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

    Ok(StoreStats {
        document_count: document_count as usize,
        embedding_count: embedding_count as usize,
        distinct_tags: distinct_tags as usize,
        earliest_date: earliest.as_deref().map(date_from_sql).transpose()?,
        latest_date: latest.as_deref().map(date_from_sql).transpose()?,
        last_indexed,
    })
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn ensure_index(&self) -> StoreResult<bool> {
        let dimensions = self.dimensions;
        self.with_conn(move |conn| {
            init_schema(conn)?;
            check_dimensions(conn, dimensions)?;
            if stored_dimensions(conn)?.is_some() {
                return Ok(false);
            }
            conn.execute(
                "INSERT INTO index_meta (key, value) VALUES (?1, ?2)",
                params![DIMS_KEY, dimensions.to_string()],
            )?;
            Ok(true)
        })
        .await
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
        let doc = doc.clone();
        self.with_conn(move |conn| upsert_document(conn, &doc)).await
    }

    async fn get(&self, url: &str) -> StoreResult<Option<Document>> {
        let url = url.to_string();
        self.with_conn(move |conn| get_document(conn, &url)).await
    }

    async fn nearest(&self, query: &KnnQuery) -> StoreResult<Vec<ScoredArticle>> {
        let query = query.clone();
        self.with_conn(move |conn| nearest_documents(conn, &query))
            .await
    }

    async fn tag_counts(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> StoreResult<Vec<TagCount>> {
        self.with_conn(move |conn| count_tags(conn, from, to, limit))
            .await
    }

    async fn keyword_search(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> StoreResult<Vec<ScoredArticle>> {
        let keywords = keywords.to_vec();
        self.with_conn(move |conn| search_keywords(conn, &keywords, limit))
            .await
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        self.with_conn(|conn| collect_stats(conn)).await
    }
}

/// Convert f32 embedding to BLOB
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for &val in embedding {
        blob.extend_from_slice(&val.to_le_bytes());
    }
    blob
}

/// Convert BLOB to f32 embedding
fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
