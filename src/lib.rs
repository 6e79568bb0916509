//! Court case retrieval via browser automation
//!
//! Drives the court portal's CAPTCHA-protected case-number search through
//! headless Chrome (chromiumoxide), parses the results table into typed
//! records, and keeps an append-only log of every query.

pub mod browser;
pub mod browser_setup;
pub mod fetcher;
mod manager;
pub mod portal;
pub mod server;
pub mod store;
pub mod types;
pub mod utils;
pub mod validation;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Where the search form lives and how its fields are located
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,

    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Page text that marks an empty result set
    #[serde(default = "default_no_data_marker")]
    pub no_data_marker: String,
}

/// CSS selectors for the portal's form controls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Hidden anti-forgery input; its `value` attribute is read
    #[serde(default = "default_token_selector")]
    pub token: String,
    /// Element whose visible text is the CAPTCHA
    #[serde(default = "default_captcha_selector")]
    pub captcha: String,
    #[serde(default = "default_case_type_selector")]
    pub case_type: String,
    #[serde(default = "default_case_number_selector")]
    pub case_number: String,
    #[serde(default = "default_year_selector")]
    pub year: String,
    #[serde(default = "default_captcha_input_selector")]
    pub captcha_input: String,
    #[serde(default = "default_submit_selector")]
    pub submit: String,
    #[serde(default = "default_results_table_selector")]
    pub results_table: String,
}

/// Browser launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Pass `--no-sandbox`; required when running as root or in containers
    #[serde(default = "default_disable_sandbox")]
    pub disable_sandbox: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,

    /// Explicit Chrome binary; `CHROMIUM_PATH` still takes precedence
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// CDP request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Additional Chrome command-line flags
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Readiness waits around page load and form submission
///
/// After navigation the CAPTCHA probe runs first and `page_settle_ms` follows
/// it. After submit `results_settle_ms` runs first: the empty table is already
/// on the page before submission, so probing for it straight away would only
/// see the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Upper bound for the CAPTCHA element to appear after navigation
    #[serde(default = "default_page_ready_timeout_ms")]
    pub page_ready_timeout_ms: u64,

    #[serde(default = "default_page_settle_ms")]
    pub page_settle_ms: u64,

    #[serde(default = "default_results_settle_ms")]
    pub results_settle_ms: u64,

    /// Upper bound for the results table to appear after submit
    #[serde(default = "default_results_timeout_ms")]
    pub results_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Latest accepted filing year; the current year when unset
    #[serde(default)]
    pub max_filing_year: Option<i32>,

    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_search_url() -> String {
    constants::DEFAULT_SEARCH_URL.to_string()
}
fn default_no_data_marker() -> String {
    constants::NO_DATA_MARKER.to_string()
}
fn default_token_selector() -> String {
    constants::TOKEN_SELECTOR.to_string()
}
fn default_captcha_selector() -> String {
    constants::CAPTCHA_SELECTOR.to_string()
}
fn default_case_type_selector() -> String {
    constants::CASE_TYPE_SELECTOR.to_string()
}
fn default_case_number_selector() -> String {
    constants::CASE_NUMBER_SELECTOR.to_string()
}
fn default_year_selector() -> String {
    constants::YEAR_SELECTOR.to_string()
}
fn default_captcha_input_selector() -> String {
    constants::CAPTCHA_INPUT_SELECTOR.to_string()
}
fn default_submit_selector() -> String {
    constants::SUBMIT_SELECTOR.to_string()
}
fn default_results_table_selector() -> String {
    constants::RESULTS_TABLE_SELECTOR.to_string()
}

fn default_headless() -> bool {
    true
}

fn default_disable_sandbox() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_page_ready_timeout_ms() -> u64 {
    15_000
}
fn default_page_settle_ms() -> u64 {
    3_000
}
fn default_results_settle_ms() -> u64 {
    5_000
}
fn default_results_timeout_ms() -> u64 {
    10_000
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_history_limit() -> u32 {
    50
}

fn default_database_path() -> PathBuf {
    PathBuf::from("court_data.db")
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            selectors: SelectorConfig::default(),
            no_data_marker: default_no_data_marker(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            token: default_token_selector(),
            captcha: default_captcha_selector(),
            case_type: default_case_type_selector(),
            case_number: default_case_number_selector(),
            year: default_year_selector(),
            captcha_input: default_captcha_input_selector(),
            submit: default_submit_selector(),
            results_table: default_results_table_selector(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_sandbox: default_disable_sandbox(),
            window: WindowConfig::default(),
            chrome_executable: None,
            user_agent: None,
            request_timeout_secs: default_request_timeout_secs(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            page_ready_timeout_ms: default_page_ready_timeout_ms(),
            page_settle_ms: default_page_settle_ms(),
            results_settle_ms: default_results_settle_ms(),
            results_timeout_ms: default_results_timeout_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_filing_year: None,
            history_limit: default_history_limit(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

impl TimingConfig {
    /// Settle floors disabled and short bounds, for scripted sessions
    pub fn immediate() -> Self {
        Self {
            page_ready_timeout_ms: 0,
            page_settle_ms: 0,
            results_settle_ms: 0,
            results_timeout_ms: 200,
        }
    }

    pub fn page_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.page_ready_timeout_ms)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn results_settle(&self) -> Duration {
        Duration::from_millis(self.results_settle_ms)
    }

    pub fn results_timeout(&self) -> Duration {
        Duration::from_millis(self.results_timeout_ms)
    }
}

impl Config {
    /// Reject values the pipeline cannot honour
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.portal.search_url)
            .with_context(|| format!("Invalid portal.search_url: {}", self.portal.search_url))?;

        utils::validate_navigation_timeout(
            "browser.navigation_timeout_ms",
            self.browser.navigation_timeout_ms,
        )?;
        utils::validate_navigation_timeout(
            "timing.page_ready_timeout_ms",
            self.timing.page_ready_timeout_ms,
        )?;
        utils::validate_navigation_timeout("timing.page_settle_ms", self.timing.page_settle_ms)?;
        utils::validate_navigation_timeout(
            "timing.results_settle_ms",
            self.timing.results_settle_ms,
        )?;
        utils::validate_interaction_timeout(
            "timing.results_timeout_ms",
            self.timing.results_timeout_ms,
        )?;

        if self.browser.window.width == 0 || self.browser.window.height == 0 {
            anyhow::bail!("browser.window dimensions must be non-zero");
        }

        Ok(())
    }
}

/// Parse and validate a YAML config document
pub fn parse_yaml_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = serde_yaml::from_str(contents).context("Failed to parse config YAML")?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or from `config.yaml` in the working directory
///
/// A missing default file yields `Config::default()`; a missing explicit path
/// is an error.
pub fn load_yaml_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let (config_path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from("config.yaml"), false),
    };

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        parse_yaml_config(&contents)
    } else if explicit {
        anyhow::bail!("Config file not found: {}", config_path.display())
    } else {
        Ok(Config::default())
    }
}

pub use browser::{BrowserError, BrowserResult, Session, SessionManager};
pub use fetcher::CaseFetcher;
pub use manager::ChromeSessionManager;
pub use store::{MemoryQueryStore, QueryStore, SqliteQueryStore};
pub use types::{
    CaseRecord, CaseSearchResult, CaseType, FetchError, FetchResult, FetchStage, SearchRequest,
    case_types,
};
pub use validation::{SearchForm, ValidationError, YearBounds};
