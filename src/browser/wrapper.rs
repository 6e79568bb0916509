//! Chrome-backed sessions
//!
//! Handles the lifetime of one chromiumoxide browser instance per fetch and
//! implements [`Session`] on top of its single page.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserResult, Session};

/// Wrapper for Browser and its event handler task
///
/// Ensures handler is properly cleaned up when browser is dropped.
/// Handler MUST be aborted to prevent it running indefinitely after
/// browser is closed.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser, wait for the process to exit and remove its profile
    ///
    /// `close()` only sends the CDP close command; without `wait()` the Chrome
    /// process lingers as a zombie and keeps the profile directory locked.
    /// A failed close or a process that outlives `EXIT_GRACE` is killed.
    pub async fn shutdown(&mut self) -> BrowserResult<()> {
        info!("Shutting down browser");

        let closed = self.browser.close().await;
        if let Err(e) = &closed {
            warn!("Failed to close browser cleanly: {}", e);
        }

        reap(&mut self.browser, closed.is_err(), EXIT_GRACE).await;
        self.cleanup_temp_dir();

        closed
            .map(|_| ())
            .map_err(|e| BrowserError::CloseFailed(e.to_string()))
    }

    /// Remove the profile directory (blocking operation)
    ///
    /// MUST be called AFTER `browser.wait()` completes so Chrome has released
    /// all file handles.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        debug!("Dropping BrowserWrapper - aborting handler task");
        self.handler.abort();
        // Browser::drop() kills the Chrome process

        if let Some(path) = &self.user_data_dir {
            warn!(
                "BrowserWrapper dropped without explicit shutdown. \
                Temp directory will be orphaned: {}",
                path.display()
            );
        }
    }
}

/// How long a closed browser gets to exit before it is killed
const EXIT_GRACE: Duration = Duration::from_secs(10);

/// The child process behind a browser
trait BrowserProcess {
    fn wait_exit(&mut self) -> impl Future<Output = std::io::Result<()>> + Send;

    fn kill_process(&mut self) -> impl Future<Output = ()> + Send;
}

impl BrowserProcess for Browser {
    async fn wait_exit(&mut self) -> std::io::Result<()> {
        self.wait().await.map(|_| ())
    }

    async fn kill_process(&mut self) {
        if let Some(Err(e)) = self.kill().await {
            warn!("Failed to kill browser process: {}", e);
        }
    }
}

/// Wait for `process` to exit without ever blocking past `grace` per attempt
///
/// Killed up front when it was never told to close, and again if it is
/// still running once `grace` has passed.
async fn reap<P: BrowserProcess>(process: &mut P, close_failed: bool, grace: Duration) {
    if close_failed {
        process.kill_process().await;
    }

    match tokio::time::timeout(grace, process.wait_exit()).await {
        Ok(Ok(())) => return,
        Ok(Err(e)) => {
            warn!("Failed to wait for browser exit: {}", e);
            return;
        }
        Err(_) => warn!(
            "Browser still running {}ms after close, killing it",
            grace.as_millis()
        ),
    }

    process.kill_process().await;
    match tokio::time::timeout(grace, process.wait_exit()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to wait for browser exit: {}", e),
        Err(_) => warn!("Browser process did not exit after kill"),
    }
}

/// One Chrome instance and the page used to drive the portal
pub struct ChromeSession {
    page: Page,
    wrapper: Mutex<BrowserWrapper>,
    navigation_timeout: Duration,
}

impl ChromeSession {
    pub(crate) fn new(page: Page, wrapper: BrowserWrapper, navigation_timeout: Duration) -> Self {
        Self {
            page,
            wrapper: Mutex::new(wrapper),
            navigation_timeout,
        }
    }

    /// First element matching `selector`
    ///
    /// Goes through `querySelectorAll` so that no match is an empty list
    /// rather than a CDP error; any error left means the browser is gone.
    async fn find(&self, selector: &str) -> BrowserResult<Option<Element>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::ReadFailed(format!("{selector}: {e}")))?;
        Ok(elements.into_iter().next())
    }

    /// Scroll into view and click at the element's centre
    ///
    /// Uses the clickable point directly instead of `Element::click`, which
    /// can hang on pages with IntersectionObserver handlers.
    async fn click_element(&self, element: &Element, selector: &str) -> BrowserResult<()> {
        let interaction = |e: chromiumoxide::error::CdpError| BrowserError::InteractionFailed {
            selector: selector.to_string(),
            message: e.to_string(),
        };

        element.scroll_into_view().await.map_err(interaction)?;
        let point = element.clickable_point().await.map_err(interaction)?;
        self.page.click(point).await.map_err(interaction)?;
        Ok(())
    }
}

#[async_trait]
impl Session for ChromeSession {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| {
                BrowserError::NavigationFailed(format!(
                    "timeout after {}ms for URL: {}",
                    self.navigation_timeout.as_millis(),
                    url
                ))
            })?
            .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;

        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;

        Ok(())
    }

    async fn element_exists(&self, selector: &str) -> BrowserResult<bool> {
        Ok(self.find(selector).await?.is_some())
    }

    async fn element_attribute(&self, selector: &str, name: &str) -> BrowserResult<Option<String>> {
        let Some(element) = self.find(selector).await? else {
            return Ok(None);
        };

        element
            .attribute(name)
            .await
            .map_err(|e| BrowserError::ReadFailed(format!("{selector}[{name}]: {e}")))
    }

    async fn element_text(&self, selector: &str) -> BrowserResult<Option<String>> {
        let Some(element) = self.find(selector).await? else {
            return Ok(None);
        };

        element
            .inner_text()
            .await
            .map_err(|e| BrowserError::ReadFailed(format!("{selector}: {e}")))
    }

    async fn select_option(&self, selector: &str, value: &str) -> BrowserResult<bool> {
        let Some(element) = self.find(selector).await? else {
            return Ok(false);
        };

        let wanted = serde_json::to_string(value).map_err(|e| BrowserError::InteractionFailed {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;

        // Only accept values the form currently offers, then fire `change`
        // so the portal's scripts see the selection.
        let function = format!(
            "function() {{ \
                const wanted = {wanted}; \
                const option = Array.from(this.options || []).find((o) => o.value === wanted); \
                if (!option) {{ return false; }} \
                this.value = wanted; \
                this.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                return true; \
            }}"
        );

        let returned = element
            .call_js_fn(function, false)
            .await
            .map_err(|e| BrowserError::InteractionFailed {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;

        Ok(returned
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn type_text(&self, selector: &str, text: &str) -> BrowserResult<bool> {
        let Some(element) = self.find(selector).await? else {
            return Ok(false);
        };

        // Fall back to programmatic focus for inputs without a clickable box
        if let Err(e) = self.click_element(&element, selector).await {
            debug!("Click to focus failed ({}), using focus()", e);
            element.focus().await.map_err(|e| BrowserError::InteractionFailed {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        }

        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| BrowserError::InteractionFailed {
                selector: selector.to_string(),
                message: format!("clear failed: {e}"),
            })?;

        element
            .type_str(text)
            .await
            .map_err(|e| BrowserError::InteractionFailed {
                selector: selector.to_string(),
                message: format!("typing failed: {e}"),
            })?;

        Ok(true)
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let element = self
            .find(selector)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))?;

        self.click_element(&element, selector).await
    }

    async fn content(&self) -> BrowserResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::ReadFailed(e.to_string()))
    }

    async fn close(self: Box<Self>) -> BrowserResult<()> {
        let ChromeSession { page, wrapper, .. } = *self;

        if let Err(e) = page.close().await {
            debug!("Failed to close page before shutdown: {}", e);
        }

        let mut wrapper = wrapper.into_inner();
        wrapper.shutdown().await
    }
}
