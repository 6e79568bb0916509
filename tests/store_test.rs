//! Query log storage

use court_case_fetcher::store::{CaseSnapshot, QueryId, StoreError, response_snapshot};
use court_case_fetcher::{
    CaseRecord, CaseSearchResult, FetchError, FetchStage, MemoryQueryStore, QueryStore,
    SearchRequest, SqliteQueryStore,
};
use serde_json::json;

fn record(serial: &str, parties: &str) -> CaseRecord {
    CaseRecord {
        serial_no: serial.to_string(),
        case_number_full: "CS(OS) 10/2023".to_string(),
        date_of_judgment: "12/05/2023".to_string(),
        parties: parties.to_string(),
        corrigendum: String::new(),
    }
}

fn found() -> (SearchRequest, CaseSearchResult) {
    (
        SearchRequest::new("S", "10", 2023),
        CaseSearchResult::new(vec![
            record("1", "ACME LTD Vs. STATE"),
            record("2", "ACME LTD Vs. UNION"),
        ]),
    )
}

#[test]
fn snapshot_projects_first_record() {
    let (request, result) = found();

    let snapshot = CaseSnapshot::from_result(&request, &result).unwrap();

    assert_eq!(snapshot.case_number_full, "S 10/2023");
    assert_eq!(snapshot.parties, "ACME LTD Vs. STATE");
    assert_eq!(snapshot.filing_date, "12/05/2023");
    assert_eq!(snapshot.next_hearing, "");
    assert_eq!(snapshot.orders.len(), 2);
    assert_eq!(snapshot.status, "Found");
}

#[test]
fn empty_result_has_no_snapshot() {
    let request = SearchRequest::new("S", "10", 2023);
    assert!(CaseSnapshot::from_result(&request, &CaseSearchResult::new(vec![])).is_none());
}

#[test]
fn response_snapshot_shapes() {
    let (_, result) = found();
    let ok = response_snapshot(&Ok(result));
    assert_eq!(ok["total_cases"], 2);
    assert_eq!(ok["search_successful"], true);
    assert_eq!(ok["cases"][0]["serial_no"], "1");

    let err = response_snapshot(&Err(FetchError::new(FetchStage::Submit, "click failed")));
    assert_eq!(err, json!({ "error": "click failed", "stage": "SUBMIT" }));
}

#[test]
fn stored_result_recomputes_counters() {
    let stored = json!({
        "cases": [serde_json::to_value(record("1", "A Vs. B")).unwrap()],
        "total_cases": 7,
        "search_successful": false
    });

    let result: CaseSearchResult = serde_json::from_value(stored).unwrap();

    assert_eq!(result.total_cases(), 1);
    assert_eq!(serde_json::to_value(&result).unwrap()["search_successful"], true);
}

async fn exercise_store(store: &dyn QueryStore) {
    let (request, result) = found();
    let outcome = Ok(result.clone());

    let failed_id = store
        .log_query(
            &SearchRequest::new("CW", "5", 2020),
            &json!({"error": "Failed to fill search form", "stage": "FORM_FILL"}),
            false,
            Some("Failed to fill search form"),
        )
        .await
        .unwrap();

    let found_id = store
        .log_query(&request, &response_snapshot(&outcome), true, None)
        .await
        .unwrap();
    assert_ne!(failed_id, found_id);

    let snapshot = CaseSnapshot::from_result(&request, &result).unwrap();
    store.save_case_snapshot(found_id, &snapshot).await.unwrap();

    let history = store.recent_history(50).await.unwrap();
    assert_eq!(history.len(), 2);

    let newest = &history[0];
    assert_eq!(newest.id, found_id);
    assert!(newest.success);
    assert_eq!(newest.case_type, "S");
    assert_eq!(newest.filing_year, 2023);
    assert_eq!(newest.parties.as_deref(), Some("ACME LTD Vs. STATE"));
    assert_eq!(newest.status.as_deref(), Some("Found"));
    assert_eq!(newest.raw_response["total_cases"], 2);

    let oldest = &history[1];
    assert_eq!(oldest.id, failed_id);
    assert!(!oldest.success);
    assert_eq!(oldest.error_message.as_deref(), Some("Failed to fill search form"));
    assert_eq!(oldest.parties, None);
    assert_eq!(oldest.raw_response["stage"], "FORM_FILL");

    let limited = store.recent_history(1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, found_id);

    let err = store
        .save_case_snapshot(QueryId(9_999), &snapshot)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownQuery(9_999)));
}

#[tokio::test]
async fn sqlite_in_memory_roundtrip() {
    let store = SqliteQueryStore::open_in_memory().await.unwrap();
    exercise_store(&store).await;
}

#[tokio::test]
async fn sqlite_file_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("court_data.db");

    {
        let store = SqliteQueryStore::open(&path).await.unwrap();
        exercise_store(&store).await;
    }

    let reopened = SqliteQueryStore::open(&path).await.unwrap();
    let history = reopened.recent_history(50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status.as_deref(), Some("Found"));
}

#[tokio::test]
async fn memory_store_roundtrip() {
    let store = MemoryQueryStore::new();
    exercise_store(&store).await;
    assert_eq!(store.len(), 2);
}
