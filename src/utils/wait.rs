//! Condition polling for client-side rendered pages
//!
//! Provides wait_until() which polls an async predicate with exponential backoff.
//! The portal renders its search form and results table via JavaScript after the
//! load event fires, so readiness is detected by probing for elements rather than
//! trusting navigation events.

use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;

/// First poll interval
const INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll interval cap
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The predicate never held within the allotted time
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("condition not met within {}ms", .0.as_millis())]
pub struct WaitTimeout(pub Duration);

/// Wait until `probe` resolves to `true` or `timeout` elapses
///
/// # Polling Strategy
/// - Probes immediately, then starts at 100ms intervals
/// - Doubles each retry (exponential backoff)
/// - Caps at 1 second maximum interval
/// - Never sleeps past the deadline
///
/// A zero timeout probes exactly once.
pub async fn wait_until<F, Fut>(timeout: Duration, mut probe: F) -> Result<(), WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    let mut poll_interval = INITIAL_POLL_INTERVAL;

    loop {
        if probe().await {
            return Ok(());
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(WaitTimeout(timeout));
        }

        tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;

        poll_interval = (poll_interval * 2).min(MAX_POLL_INTERVAL);
    }
}

/// Fixed settle delay; zero is a no-op
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
