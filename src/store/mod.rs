//! Query log and case snapshot storage
//!
//! Every fetch attempt is appended to the query log, successful or not. When a
//! fetch finds at least one case, a denormalized snapshot of it is written and
//! linked to the log entry. Nothing is ever updated in place.

mod memory;
mod sqlite;

pub use memory::MemoryQueryStore;
pub use sqlite::SqliteQueryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::types::{CaseRecord, CaseSearchResult, FetchResult, SearchRequest};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown query id: {0}")]
    UnknownQuery(i64),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque handle linking a snapshot to its log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(pub i64);

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Denormalized projection of a successful result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    /// `"{type} {number}/{year}"` as searched
    pub case_number_full: String,
    pub parties: String,
    pub filing_date: String,
    pub next_hearing: String,
    /// Every record returned by the search
    pub orders: Vec<CaseRecord>,
    pub status: String,
}

impl CaseSnapshot {
    /// Snapshot of the first record; `None` when the result is empty
    pub fn from_result(request: &SearchRequest, result: &CaseSearchResult) -> Option<Self> {
        let first = result.first()?;
        Some(Self {
            case_number_full: request.display_id(),
            parties: first.parties.clone(),
            filing_date: first.date_of_judgment.clone(),
            next_hearing: String::new(),
            orders: result.cases().to_vec(),
            status: "Found".to_string(),
        })
    }
}

/// One row of the search history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: QueryId,
    pub case_type: String,
    pub case_number: String,
    pub filing_year: i32,
    pub query_time: DateTime<Utc>,
    pub raw_response: serde_json::Value,
    pub success: bool,
    pub error_message: Option<String>,
    /// From the linked snapshot, if any
    pub parties: Option<String>,
    pub status: Option<String>,
}

/// JSON stored as the raw response of an attempt
pub fn response_snapshot(outcome: &FetchResult) -> serde_json::Value {
    match outcome {
        Ok(result) => serde_json::to_value(result).unwrap_or_else(|e| {
            json!({ "error": format!("Failed to serialize result: {e}") })
        }),
        Err(e) => json!({ "error": e.message, "stage": e.stage }),
    }
}

#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Append one attempt to the log
    async fn log_query(
        &self,
        request: &SearchRequest,
        raw_response: &serde_json::Value,
        success: bool,
        error_message: Option<&str>,
    ) -> StoreResult<QueryId>;

    /// Record the case found by attempt `query_id`
    async fn save_case_snapshot(&self, query_id: QueryId, snapshot: &CaseSnapshot) -> StoreResult<()>;

    /// Most recent attempts, newest first
    async fn recent_history(&self, limit: u32) -> StoreResult<Vec<HistoryEntry>>;
}
