//! Search form population

use tracing::{debug, warn};

use crate::SelectorConfig;
use crate::browser::{BrowserResult, Session};
use crate::types::SearchRequest;

/// Populate case type, number, year and CAPTCHA
///
/// Returns `false` as soon as a field cannot be located or set, including an
/// option value the form does not currently offer. Does not submit.
pub async fn fill(
    session: &dyn Session,
    selectors: &SelectorConfig,
    request: &SearchRequest,
    captcha: &str,
) -> bool {
    let year = request.filing_year.to_string();

    let steps: [(&str, &str, &str, bool); 4] = [
        ("case type", selectors.case_type.as_str(), request.case_type.as_str(), true),
        ("case number", selectors.case_number.as_str(), request.case_number.as_str(), false),
        ("filing year", selectors.year.as_str(), year.as_str(), true),
        ("captcha", selectors.captcha_input.as_str(), captcha, false),
    ];

    for (field, selector, value, is_select) in steps {
        let outcome: BrowserResult<bool> = if is_select {
            session.select_option(selector, value).await
        } else {
            session.type_text(selector, value).await
        };

        match outcome {
            Ok(true) => debug!("Set {} field '{}'", field, selector),
            Ok(false) => {
                warn!(
                    "Error filling form: {} '{}' could not be set via '{}'",
                    field, value, selector
                );
                return false;
            }
            Err(e) => {
                warn!("Error filling form: {} via '{}': {}", field, selector, e);
                return false;
            }
        }
    }

    true
}
