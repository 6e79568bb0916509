//! Per-page token and CAPTCHA extraction
//!
//! Both values are ephemeral and tied to the page that was just loaded. Reads
//! never touch page state, and absence is reported as `None` so the caller
//! decides whether it is fatal.

use tracing::{debug, warn};

use crate::SelectorConfig;
use crate::browser::Session;

/// Value of the hidden anti-forgery input
pub async fn extract_token(session: &dyn Session, selectors: &SelectorConfig) -> Option<String> {
    match session.element_attribute(&selectors.token, "value").await {
        Ok(Some(token)) if !token.trim().is_empty() => Some(token),
        Ok(_) => {
            warn!("Anti-forgery token not found at '{}'", selectors.token);
            None
        }
        Err(e) => {
            warn!("Error extracting token: {}", e);
            None
        }
    }
}

/// Visible CAPTCHA text, trimmed
pub async fn extract_captcha(session: &dyn Session, selectors: &SelectorConfig) -> Option<String> {
    match session.element_text(&selectors.captcha).await {
        Ok(Some(text)) => {
            let captcha = text.trim();
            if captcha.is_empty() {
                warn!("CAPTCHA element '{}' has no text", selectors.captcha);
                None
            } else {
                debug!("Extracted captcha: {}", captcha);
                Some(captcha.to_string())
            }
        }
        Ok(None) => {
            warn!("CAPTCHA element not found at '{}'", selectors.captcha);
            None
        }
        Err(e) => {
            warn!("Error extracting captcha: {}", e);
            None
        }
    }
}
