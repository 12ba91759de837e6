//! Gleaner Storage Layer
//!
//! Implements the AnalysisStore trait on top of SQLite.
//!
//! # Architecture
//!
//! - One `analyses` table; records are append-only
//! - Topic and keyword lists stored as JSON text and searched with `json_each`
//! - Ids stored as 16-byte big-endian blobs so they sort like the UUIDv7 they are
//!
//! # Examples
//!
//! ```no_run
//! use gleaner_domain::{AnalysisQuery, AnalysisStore};
//! use gleaner_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! let recent = store.search(&AnalysisQuery::new().with_topic("finance")).unwrap();
//! ```

#![warn(missing_docs)]

use gleaner_domain::traits::{AnalysisQuery, AnalysisStore};
use gleaner_domain::{Analysis, AnalysisId, AnalysisStatus, Sentiment};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Topic or keyword list could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

const COLUMNS: &str = "id, original_text, summary, title, topics, sentiment, keywords, \
                       confidence_score, status, failure_reason, created_at";

/// SQLite-based implementation of AnalysisStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Callers sharing one store across
/// tasks wrap it in a mutex.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        info!("Analysis store ready at {}", path.as_ref().display());
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert AnalysisId to bytes for storage
    fn id_to_bytes(id: AnalysisId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to AnalysisId
    fn bytes_to_id(bytes: &[u8]) -> Result<AnalysisId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!(
                "Expected 16 bytes for AnalysisId, got {}",
                bytes.len()
            ))
        })?;
        Ok(AnalysisId::from_value(u128::from_be_bytes(arr)))
    }

    /// Lowercased JSON copy of a list, matched by search filters
    fn folded(values: &[String]) -> Result<String, StoreError> {
        let lowered: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
        Ok(serde_json::to_string(&lowered)?)
    }

    fn row_to_analysis(row: &Row<'_>) -> rusqlite::Result<Analysis> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| conversion_error(0, Type::Blob, e))?;

        let topics: String = row.get(4)?;
        let topics: Vec<String> =
            serde_json::from_str(&topics).map_err(|e| conversion_error(4, Type::Text, e))?;

        let sentiment: String = row.get(5)?;
        let sentiment = Sentiment::parse(&sentiment).ok_or_else(|| {
            conversion_error(
                5,
                Type::Text,
                StoreError::InvalidData(format!("Unknown sentiment: {}", sentiment)),
            )
        })?;

        let keywords: String = row.get(6)?;
        let keywords: Vec<String> =
            serde_json::from_str(&keywords).map_err(|e| conversion_error(6, Type::Text, e))?;

        let status: String = row.get(8)?;
        let status = AnalysisStatus::parse(&status).ok_or_else(|| {
            conversion_error(
                8,
                Type::Text,
                StoreError::InvalidData(format!("Unknown status: {}", status)),
            )
        })?;

        Ok(Analysis {
            id,
            original_text: row.get(1)?,
            summary: row.get(2)?,
            title: row.get(3)?,
            topics,
            sentiment,
            keywords,
            confidence_score: row.get(7)?,
            status,
            failure_reason: row.get(9)?,
            created_at: row.get::<_, i64>(10)? as u64,
        })
    }

    /// WHERE clause and parameters shared by search and count
    fn filter_clause(query: &AnalysisQuery) -> (String, Vec<Box<dyn ToSql>>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(topic) = query.topic_filter() {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(analyses.topics_folded) \
                 WHERE json_each.value LIKE ? ESCAPE '\\')",
            );
            params.push(Box::new(like_pattern(topic)));
        }

        if let Some(keyword) = query.keyword_filter() {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(analyses.keywords_folded) \
                 WHERE json_each.value LIKE ? ESCAPE '\\')",
            );
            params.push(Box::new(like_pattern(keyword)));
        }

        (sql, params)
    }
}

fn conversion_error<E>(idx: usize, ty: Type, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl AnalysisStore for SqliteStore {
    type Error = StoreError;

    fn save(&mut self, analysis: &Analysis) -> Result<AnalysisId, Self::Error> {
        let inserted = self.conn.execute(
            "INSERT INTO analyses (id, original_text, summary, title, topics, sentiment, keywords,
                                   topics_folded, keywords_folded, confidence_score, status,
                                   failure_reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(id) DO NOTHING",
            params![
                Self::id_to_bytes(analysis.id),
                &analysis.original_text,
                &analysis.summary,
                &analysis.title,
                serde_json::to_string(&analysis.topics)?,
                analysis.sentiment.as_str(),
                serde_json::to_string(&analysis.keywords)?,
                Self::folded(&analysis.topics)?,
                Self::folded(&analysis.keywords)?,
                analysis.confidence_score,
                analysis.status.as_str(),
                &analysis.failure_reason,
                analysis.created_at as i64,
            ],
        )?;

        if inserted == 0 {
            debug!("Analysis {} already stored", analysis.id);
        }

        Ok(analysis.id)
    }

    fn get(&self, id: AnalysisId) -> Result<Option<Analysis>, Self::Error> {
        let analysis = self
            .conn
            .query_row(
                &format!("SELECT {} FROM analyses WHERE id = ?1", COLUMNS),
                params![Self::id_to_bytes(id)],
                Self::row_to_analysis,
            )
            .optional()?;

        Ok(analysis)
    }

    fn search(&self, query: &AnalysisQuery) -> Result<Vec<Analysis>, Self::Error> {
        let (filter, mut params) = Self::filter_clause(query);
        let sql = format!(
            "SELECT {} FROM analyses{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            COLUMNS, filter
        );
        params.push(Box::new(query.effective_limit() as i64));
        params.push(Box::new(query.offset as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let analyses = stmt
            .query_map(&param_refs[..], Self::row_to_analysis)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(analyses)
    }

    fn count(&self, query: &AnalysisQuery) -> Result<usize, Self::Error> {
        let (filter, params) = Self::filter_clause(query);
        let sql = format!("SELECT COUNT(*) FROM analyses{}", filter);
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = self.conn.query_row(&sql, &param_refs[..], |row| row.get(0))?;
        Ok(count as usize)
    }
}
