//! In-process query log for tests and ephemeral runs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::{CaseSnapshot, HistoryEntry, QueryId, QueryStore, StoreError, StoreResult};
use crate::types::SearchRequest;

#[derive(Default)]
struct Inner {
    entries: Vec<HistoryEntry>,
    snapshots: HashMap<QueryId, CaseSnapshot>,
}

#[derive(Default)]
pub struct MemoryQueryStore {
    inner: Mutex<Inner>,
}

impl MemoryQueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self, query_id: QueryId) -> Option<CaseSnapshot> {
        self.inner.lock().snapshots.get(&query_id).cloned()
    }
}

#[async_trait]
impl QueryStore for MemoryQueryStore {
    async fn log_query(
        &self,
        request: &SearchRequest,
        raw_response: &serde_json::Value,
        success: bool,
        error_message: Option<&str>,
    ) -> StoreResult<QueryId> {
        let mut inner = self.inner.lock();
        let id = QueryId(inner.entries.len() as i64 + 1);

        inner.entries.push(HistoryEntry {
            id,
            case_type: request.case_type.clone(),
            case_number: request.case_number.clone(),
            filing_year: request.filing_year,
            query_time: Utc::now(),
            raw_response: raw_response.clone(),
            success,
            error_message: error_message.map(str::to_string),
            parties: None,
            status: None,
        });

        Ok(id)
    }

    async fn save_case_snapshot(&self, query_id: QueryId, snapshot: &CaseSnapshot) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.id == query_id)
            .ok_or(StoreError::UnknownQuery(query_id.0))?;

        entry.parties = Some(snapshot.parties.clone());
        entry.status = Some(snapshot.status.clone());
        inner.snapshots.insert(query_id, snapshot.clone());

        Ok(())
    }

    async fn recent_history(&self, limit: u32) -> StoreResult<Vec<HistoryEntry>> {
        let inner = self.inner.lock();
        Ok(inner
            .entries
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
