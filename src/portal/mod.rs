//! Portal page components
//!
//! Everything that knows about the portal's markup lives here: reading the
//! per-page token and CAPTCHA, filling the search form, and turning the results
//! table into [`CaseRecord`](crate::types::CaseRecord)s.

pub mod form;
pub mod results;
pub mod tokens;

pub use form::fill;
pub use results::{ResultsPage, parse, parse_results_html};
pub use tokens::{extract_captcha, extract_token};
