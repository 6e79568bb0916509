//! Per-fetch Chrome session manager
//!
//! Every `open()` launches a fresh Chrome process with its own profile
//! directory. Nothing is cached between calls, so concurrent fetches never
//! share a browser or a page.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::BrowserConfig;
use crate::browser::{BrowserError, BrowserResult, BrowserWrapper, ChromeSession, Session, SessionManager};
use crate::browser_setup::launch_browser;

pub struct ChromeSessionManager {
    config: BrowserConfig,
}

impl ChromeSessionManager {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionManager for ChromeSessionManager {
    async fn open(&self) -> BrowserResult<Box<dyn Session>> {
        let user_data_dir = std::env::temp_dir().join(format!(
            "court_case_fetcher_{}",
            uuid::Uuid::new_v4().simple()
        ));

        let (browser, handler, user_data_dir) = launch_browser(&self.config, user_data_dir)
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;
        let mut wrapper = BrowserWrapper::new(browser, handler, user_data_dir);

        let page = match wrapper.browser().new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // The process is already running; release it before reporting.
                if let Err(close_err) = wrapper.shutdown().await {
                    warn!("Failed to shut down browser after page error: {}", close_err);
                }
                return Err(BrowserError::PageCreationFailed(e.to_string()));
            }
        };

        info!("Browser session opened");
        Ok(Box::new(ChromeSession::new(
            page,
            wrapper,
            self.config.navigation_timeout(),
        )))
    }
}
