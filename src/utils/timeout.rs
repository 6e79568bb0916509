//! Timeout validation for configured browser waits

use std::time::Duration;

use thiserror::Error;

/// Maximum timeout for navigation and page-readiness waits (5 minutes)
/// Covers slow government portals and network delays
pub const MAX_NAVIGATION_TIMEOUT_MS: u64 = 300_000;

/// Maximum timeout for element waits such as the results table (30 seconds)
pub const MAX_INTERACTION_TIMEOUT_MS: u64 = 30_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name} cannot exceed {max_ms}ms. Received: {received_ms}ms")]
pub struct TimeoutError {
    pub name: &'static str,
    pub max_ms: u64,
    pub received_ms: u64,
}

/// Validate a navigation-class timeout (page load, readiness)
///
/// # Example
/// ```rust
/// use court_case_fetcher::utils::validate_navigation_timeout;
///
/// let timeout = validate_navigation_timeout("navigation_timeout_ms", 45_000).unwrap();
/// assert_eq!(timeout.as_secs(), 45);
/// ```
pub fn validate_navigation_timeout(name: &'static str, ms: u64) -> Result<Duration, TimeoutError> {
    validate(name, ms, MAX_NAVIGATION_TIMEOUT_MS)
}

/// Validate an interaction-class timeout (element waits)
pub fn validate_interaction_timeout(name: &'static str, ms: u64) -> Result<Duration, TimeoutError> {
    validate(name, ms, MAX_INTERACTION_TIMEOUT_MS)
}

fn validate(name: &'static str, ms: u64, max_ms: u64) -> Result<Duration, TimeoutError> {
    if ms > max_ms {
        return Err(TimeoutError {
            name,
            max_ms,
            received_ms: ms,
        });
    }

    Ok(Duration::from_millis(ms))
}
