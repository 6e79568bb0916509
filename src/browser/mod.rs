//! Browser sessions for driving the portal's search form
//!
//! A [`Session`] is one isolated browser instance plus the page it is
//! showing. The portal components only talk to this trait, so the pipeline
//! can be exercised against scripted pages without launching Chrome.

mod wrapper;

pub use crate::browser_setup::{download_managed_browser, find_browser_executable};
pub use wrapper::{BrowserWrapper, ChromeSession};

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::utils::wait_until;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to find browser executable: {0}")]
    NotFound(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found for selector '{0}'")]
    ElementNotFound(String),

    #[error("Interaction failed for selector '{selector}': {message}")]
    InteractionFailed { selector: String, message: String },

    #[error("Failed to read page: {0}")]
    ReadFailed(String),

    #[error("Failed to close browser: {0}")]
    CloseFailed(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;

/// One exclusive browser instance and its current page
///
/// Lookups that find nothing return `Ok(None)` / `Ok(false)`; errors are
/// reserved for a browser that stopped responding.
#[async_trait]
pub trait Session: Send + Sync {
    /// Load `url` and wait for the navigation to commit
    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    /// Whether at least one element matches `selector`
    async fn element_exists(&self, selector: &str) -> BrowserResult<bool>;

    /// Attribute value of the first element matching `selector`
    async fn element_attribute(&self, selector: &str, name: &str) -> BrowserResult<Option<String>>;

    /// Rendered text of the first element matching `selector`
    async fn element_text(&self, selector: &str) -> BrowserResult<Option<String>>;

    /// Select the `<option>` whose value is `value`; `false` if the select or
    /// the option is missing
    async fn select_option(&self, selector: &str, value: &str) -> BrowserResult<bool>;

    /// Clear the input matching `selector` and type `text`; `false` if the
    /// input is missing
    async fn type_text(&self, selector: &str, text: &str) -> BrowserResult<bool>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> BrowserResult<()>;

    /// Serialized HTML of the current document
    async fn content(&self) -> BrowserResult<String>;

    /// Shut the browser down and release its resources
    async fn close(self: Box<Self>) -> BrowserResult<()>;
}

/// Opens and closes [`Session`]s
///
/// Sessions are never pooled: every `open` yields a fresh instance that the
/// caller owns until it hands it back to `close`.
#[async_trait]
pub trait SessionManager: Send + Sync {
    async fn open(&self) -> BrowserResult<Box<dyn Session>>;

    async fn close(&self, session: Box<dyn Session>) -> BrowserResult<()> {
        session.close().await
    }
}

/// Poll until `selector` matches, for at most `timeout`
///
/// `Ok(false)` when the element never appeared. A browser error ends the wait
/// immediately and is returned as-is.
pub async fn wait_for_element(
    session: &dyn Session,
    selector: &str,
    timeout: Duration,
) -> BrowserResult<bool> {
    let failure: Mutex<Option<BrowserError>> = Mutex::new(None);
    let failure_slot = &failure;

    let waited = wait_until(timeout, move || async move {
        match session.element_exists(selector).await {
            Ok(found) => found,
            Err(e) => {
                *failure_slot.lock() = Some(e);
                true
            }
        }
    })
    .await;

    match failure.into_inner() {
        Some(e) => Err(e),
        None => Ok(waited.is_ok()),
    }
}
