//! Portal and browser defaults
//!
//! Default values used by the configuration layer. Every selector here can be
//! overridden in `config.yaml` when the portal markup drifts.

/// Chrome user agent presented to the portal
///
/// Chrome releases new stable versions ~every 4 weeks.
/// Update quarterly to stay within reasonable version window.
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Case-number search page of the Delhi High Court portal
pub const DEFAULT_SEARCH_URL: &str = "https://delhihighcourt.nic.in/app/case-number";

pub const TOKEN_SELECTOR: &str = "input[name='_token']";
pub const CAPTCHA_SELECTOR: &str = "#captcha-code";
pub const CASE_TYPE_SELECTOR: &str = "select[name='case_type']";
pub const CASE_NUMBER_SELECTOR: &str = "input[name='case_number']";
pub const YEAR_SELECTOR: &str = "select[name='year']";
pub const CAPTCHA_INPUT_SELECTOR: &str = "input[name='captchaInput']";
pub const SUBMIT_SELECTOR: &str = "#search";
pub const RESULTS_TABLE_SELECTOR: &str = "table";

/// Text the portal's data table renders for an empty result set
pub const NO_DATA_MARKER: &str = "No data available in table";

/// Earliest filing year the portal accepts
pub const MIN_FILING_YEAR: i32 = 1951;
