//! SQLite-backed query log

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tracing::info;

use super::{CaseSnapshot, HistoryEntry, QueryId, QueryStore, StoreError, StoreResult};
use crate::types::SearchRequest;

const SCHEMA_SQL: &str = r#"
-- Every search attempt, successful or not
CREATE TABLE IF NOT EXISTS queries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_type TEXT NOT NULL,
    case_number TEXT NOT NULL,
    filing_year INTEGER NOT NULL,
    query_time TEXT NOT NULL,
    raw_response TEXT,
    success BOOLEAN NOT NULL DEFAULT FALSE,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_queries_time ON queries(query_time);

-- Case data captured from successful searches
CREATE TABLE IF NOT EXISTS case_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query_id INTEGER NOT NULL,
    case_number_full TEXT,
    parties TEXT,
    filing_date TEXT,
    next_hearing TEXT,
    orders_json TEXT,
    status TEXT,
    FOREIGN KEY (query_id) REFERENCES queries (id)
);

CREATE INDEX IF NOT EXISTS idx_case_data_query ON case_data(query_id);
"#;

type HistoryRow = (
    i64,
    String,
    String,
    i64,
    String,
    Option<String>,
    bool,
    Option<String>,
    Option<String>,
    Option<String>,
);

#[derive(Clone)]
pub struct SqliteQueryStore {
    pool: SqlitePool,
}

impl SqliteQueryStore {
    /// Open or create the database file at `path`
    pub async fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(sqlx::Error::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        info!("Opened query log at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Private in-memory database; lives as long as the store
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Each connection to `:memory:` is its own database, so pin to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<std::time::Duration>)
            .max_lifetime(None::<std::time::Duration>)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::query(SCHEMA_SQL).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl QueryStore for SqliteQueryStore {
    async fn log_query(
        &self,
        request: &SearchRequest,
        raw_response: &serde_json::Value,
        success: bool,
        error_message: Option<&str>,
    ) -> StoreResult<QueryId> {
        let raw = serde_json::to_string(raw_response)?;

        let result = sqlx::query(
            r#"
            INSERT INTO queries (case_type, case_number, filing_year, query_time, raw_response, success, error_message)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.case_type)
        .bind(&request.case_number)
        .bind(request.filing_year)
        .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(raw)
        .bind(success)
        .bind(error_message)
        .execute(&self.pool)
        .await?;

        Ok(QueryId(result.last_insert_rowid()))
    }

    async fn save_case_snapshot(&self, query_id: QueryId, snapshot: &CaseSnapshot) -> StoreResult<()> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM queries WHERE id = ?")
            .bind(query_id.0)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StoreError::UnknownQuery(query_id.0));
        }

        let orders = serde_json::to_string(&snapshot.orders)?;

        sqlx::query(
            r#"
            INSERT INTO case_data (query_id, case_number_full, parties, filing_date, next_hearing, orders_json, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(query_id.0)
        .bind(&snapshot.case_number_full)
        .bind(&snapshot.parties)
        .bind(&snapshot.filing_date)
        .bind(&snapshot.next_hearing)
        .bind(orders)
        .bind(&snapshot.status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent_history(&self, limit: u32) -> StoreResult<Vec<HistoryEntry>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT q.id, q.case_type, q.case_number, q.filing_year, q.query_time,
                   q.raw_response, q.success, q.error_message, c.parties, c.status
            FROM queries q
            LEFT JOIN case_data c ON q.id = c.query_id
            ORDER BY q.query_time DESC, q.id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(history_entry).collect()
    }
}

fn history_entry(row: HistoryRow) -> StoreResult<HistoryEntry> {
    let (id, case_type, case_number, filing_year, query_time, raw, success, error_message, parties, status) =
        row;

    let query_time = DateTime::parse_from_rfc3339(&query_time)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;

    let raw_response = match raw {
        Some(raw) => serde_json::from_str(&raw)?,
        None => serde_json::Value::Null,
    };

    Ok(HistoryEntry {
        id: QueryId(id),
        case_type,
        case_number,
        filing_year: i32::try_from(filing_year)
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
        query_time,
        raw_response,
        success,
        error_message,
        parties,
        status,
    })
}
