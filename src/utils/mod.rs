pub mod constants;
mod timeout;
mod wait;

pub use timeout::{
    MAX_INTERACTION_TIMEOUT_MS, MAX_NAVIGATION_TIMEOUT_MS, TimeoutError,
    validate_interaction_timeout, validate_navigation_timeout,
};
pub use wait::{WaitTimeout, settle, wait_until};
