//! Case retrieval orchestration
//!
//! One fetch is a single pass through the portal:
//!
//! ```text
//! open session → load search page → read token + CAPTCHA → fill form
//!   → submit → parse results → close session
//! ```
//!
//! There are no retries. The first failing step ends the fetch with a
//! [`FetchError`] tagged by stage, and the session is closed on every path.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::browser::{Session, SessionManager, wait_for_element};
use crate::portal::{self, extract_captcha, extract_token};
use crate::types::{CaseSearchResult, FetchError, FetchResult, FetchStage, SearchRequest};
use crate::utils::settle;
use crate::{PortalConfig, TimingConfig};

#[derive(Clone)]
pub struct CaseFetcher {
    sessions: Arc<dyn SessionManager>,
    portal: PortalConfig,
    timing: TimingConfig,
}

impl CaseFetcher {
    pub fn new(sessions: Arc<dyn SessionManager>, portal: PortalConfig, timing: TimingConfig) -> Self {
        Self {
            sessions,
            portal,
            timing,
        }
    }

    /// Run one search against the portal
    ///
    /// Never panics or propagates browser errors: every outcome is either the
    /// parsed result or a [`FetchError`]. `FetchStage::NoResults` means the
    /// portal answered and the case does not exist.
    pub async fn fetch(&self, request: &SearchRequest) -> FetchResult {
        info!("Starting search for: {}", request.display_id());

        let session = match self.sessions.open().await {
            Ok(session) => session,
            Err(e) => {
                let err = FetchError::transport(format!("Failed to open browser session: {e}"));
                error!("{}", err);
                return Err(err);
            }
        };

        let outcome = self.drive(session.as_ref(), request).await;

        if let Err(e) = self.sessions.close(session).await {
            warn!("Browser session did not close cleanly: {}", e);
        }

        match &outcome {
            Ok(result) => info!(
                "Search for {} returned {} case(s)",
                request.display_id(),
                result.total_cases()
            ),
            Err(e) if e.is_no_results() => info!("No results for {}", request.display_id()),
            Err(e) => warn!("Search for {} failed at {}: {}", request.display_id(), e.stage, e.message),
        }

        outcome
    }

    async fn drive(&self, session: &dyn Session, request: &SearchRequest) -> FetchResult {
        let selectors = &self.portal.selectors;

        session
            .navigate(&self.portal.search_url)
            .await
            .map_err(|e| FetchError::transport(format!("Failed to load search page: {e}")))?;

        let ready = wait_for_element(session, &selectors.captcha, self.timing.page_ready_timeout())
            .await
            .map_err(|e| FetchError::transport(format!("Browser stopped responding: {e}")))?;
        if !ready {
            debug!(
                "CAPTCHA '{}' not present after {}ms",
                selectors.captcha,
                self.timing.page_ready_timeout().as_millis()
            );
        }
        settle(self.timing.page_settle()).await;

        let token = extract_token(session, selectors).await;
        let captcha = extract_captcha(session, selectors).await;
        let (Some(_token), Some(captcha)) = (token, captcha) else {
            return Err(FetchError::new(
                FetchStage::TokenExtraction,
                "Could not extract token or captcha",
            ));
        };

        if !portal::fill(session, selectors, request, &captcha).await {
            return Err(FetchError::new(FetchStage::FormFill, "Failed to fill search form"));
        }

        session.click(&selectors.submit).await.map_err(|e| {
            FetchError::new(FetchStage::Submit, format!("Failed to submit search form: {e}"))
        })?;
        settle(self.timing.results_settle()).await;

        match portal::parse(session, &self.portal, self.timing.results_timeout()).await? {
            Some(cases) => Ok(CaseSearchResult::new(cases)),
            None => Err(FetchError::no_results()),
        }
    }
}
