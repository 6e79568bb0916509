//! HTTP front end for case searches
//!
//! Every `POST /search` that passes validation is fetched, logged to the
//! query store exactly once, and snapshotted when at least one case came back.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Form, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::fetcher::CaseFetcher;
use crate::manager::ChromeSessionManager;
use crate::store::{
    CaseSnapshot, HistoryEntry, QueryId, QueryStore, SqliteQueryStore, response_snapshot,
};
use crate::types::{CaseSearchResult, CaseType, FetchStage, SearchRequest, case_types};
use crate::validation::{SearchForm, YearBounds};
use crate::{Config, ServerConfig};

#[derive(Clone)]
pub struct AppState {
    fetcher: Arc<CaseFetcher>,
    store: Arc<dyn QueryStore>,
    max_filing_year: Option<i32>,
    history_limit: u32,
}

impl AppState {
    pub fn new(fetcher: Arc<CaseFetcher>, store: Arc<dyn QueryStore>, server: &ServerConfig) -> Self {
        Self {
            fetcher,
            store,
            max_filing_year: server.max_filing_year,
            history_limit: server.history_limit,
        }
    }

    /// Re-evaluated per request so an unset maximum follows the calendar
    fn bounds(&self) -> YearBounds {
        YearBounds::with_max(self.max_filing_year)
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    code: String,
    message: String,
}

fn json_error(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            code: code.into(),
            message: message.into(),
        }),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/history", get(history))
        .route("/api/case-types", get(list_case_types))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .with_state(state)
}

/// Bind `config.server.bind` and serve until Ctrl-C
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = SqliteQueryStore::open(&config.database.path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path.display()))?;

    let sessions = Arc::new(ChromeSessionManager::new(config.browser.clone()));
    let fetcher = Arc::new(CaseFetcher::new(
        sessions,
        config.portal.clone(),
        config.timing.clone(),
    ));
    let state = AppState::new(fetcher, Arc::new(store), &config.server);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct IndexResponse {
    case_types: &'static [CaseType],
    years: Vec<i32>,
}

async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        case_types: case_types(),
        years: state.bounds().years_descending(),
    })
}

async fn list_case_types() -> Json<&'static [CaseType]> {
    Json(case_types())
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    query_id: QueryId,
    search_params: SearchRequest,
    /// `found`, `not_found` or `failed`
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    case_data: Option<CaseSearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<FetchStage>,
}

async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<(StatusCode, Json<SearchResponse>), ApiError> {
    let request = form
        .validate(state.bounds())
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_input", e.to_string()))?;

    let outcome = state.fetcher.fetch(&request).await;
    let raw_response = response_snapshot(&outcome);
    let error_message = outcome.as_ref().err().map(|e| e.message.as_str());

    let query_id = state
        .store
        .log_query(&request, &raw_response, outcome.is_ok(), error_message)
        .await
        .map_err(|e| {
            error!("Failed to log query {}: {}", request.display_id(), e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        })?;

    let response = match outcome {
        Ok(result) => {
            if let Some(snapshot) = CaseSnapshot::from_result(&request, &result) {
                // The attempt is already logged; a lost snapshot only thins history.
                if let Err(e) = state.store.save_case_snapshot(query_id, &snapshot).await {
                    warn!("Failed to save case snapshot for query {}: {}", query_id, e);
                }
            }
            (
                StatusCode::OK,
                SearchResponse {
                    query_id,
                    search_params: request,
                    status: "found",
                    case_data: Some(result),
                    error: None,
                    stage: None,
                },
            )
        }
        Err(e) => {
            let (status, label) = if e.is_no_results() {
                (StatusCode::NOT_FOUND, "not_found")
            } else {
                (StatusCode::BAD_GATEWAY, "failed")
            };
            (
                status,
                SearchResponse {
                    query_id,
                    search_params: request,
                    status: label,
                    case_data: None,
                    error: Some(e.message),
                    stage: Some(e.stage),
                },
            )
        }
    };

    Ok((response.0, Json(response.1)))
}

async fn history(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    state
        .store
        .recent_history(state.history_limit)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to load history: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        })
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    json_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("No route for {}", uri.path()),
    )
}
