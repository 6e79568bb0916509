//! Scripted browser sessions for exercising the fetch pipeline without Chrome

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use court_case_fetcher::{
    BrowserError, BrowserResult, CaseFetcher, PortalConfig, SelectorConfig, Session,
    SessionManager, TimingConfig, case_types,
};

/// What the fake portal page looks like and how it misbehaves
#[derive(Debug, Clone)]
pub struct PageScript {
    pub fail_open: bool,
    pub fail_navigate: bool,
    pub token: Option<String>,
    pub captcha: Option<String>,
    /// Option values offered by each `<select>`
    pub options: HashMap<String, Vec<String>>,
    /// Inputs that accept typing
    pub inputs: Vec<String>,
    pub fail_click: bool,
    /// Whether a results table renders after submit
    pub table_renders: bool,
    /// Every read fails once the form was submitted
    pub crash_after_submit: bool,
    pub results_html: String,
}

impl PageScript {
    /// A well-behaved search page whose results are `results_html`
    pub fn portal(results_html: impl Into<String>) -> Self {
        let selectors = SelectorConfig::default();

        let mut options = HashMap::new();
        options.insert(
            selectors.case_type.clone(),
            case_types().iter().map(|t| t.code.to_string()).collect(),
        );
        options.insert(
            selectors.year.clone(),
            (1951..=2030).map(|y: i32| y.to_string()).collect(),
        );

        Self {
            fail_open: false,
            fail_navigate: false,
            token: Some("tok-5f2a9c".to_string()),
            captcha: Some("  7KQ2  ".to_string()),
            options,
            inputs: vec![selectors.case_number.clone(), selectors.captcha_input.clone()],
            fail_click: false,
            table_renders: true,
            crash_after_submit: false,
            results_html: results_html.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub navigations: AtomicUsize,
    pub fills: AtomicUsize,
    pub clicks: AtomicUsize,
    /// Selector and value of every field set, in order
    pub filled: Mutex<Vec<(String, String)>>,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn fills(&self) -> usize {
        self.fills.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    pub fn filled(&self) -> Vec<(String, String)> {
        self.filled.lock().clone()
    }
}

pub struct FakeSessionManager {
    script: PageScript,
    counters: Arc<Counters>,
}

impl FakeSessionManager {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }
}

#[async_trait]
impl SessionManager for FakeSessionManager {
    async fn open(&self) -> BrowserResult<Box<dyn Session>> {
        if self.script.fail_open {
            return Err(BrowserError::LaunchFailed("chrome exited with status 127".into()));
        }
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            script: self.script.clone(),
            selectors: SelectorConfig::default(),
            counters: self.counters.clone(),
            submitted: Mutex::new(false),
        }))
    }
}

pub struct FakeSession {
    script: PageScript,
    selectors: SelectorConfig,
    counters: Arc<Counters>,
    submitted: Mutex<bool>,
}

impl FakeSession {
    fn check_alive(&self) -> BrowserResult<()> {
        if self.script.crash_after_submit && *self.submitted.lock() {
            return Err(BrowserError::ReadFailed("Target closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_navigate {
            return Err(BrowserError::NavigationFailed(format!("net::ERR_NAME_NOT_RESOLVED at {url}")));
        }
        Ok(())
    }

    async fn element_exists(&self, selector: &str) -> BrowserResult<bool> {
        self.check_alive()?;
        if selector == self.selectors.captcha {
            return Ok(self.script.captcha.is_some());
        }
        if selector == self.selectors.results_table {
            return Ok(*self.submitted.lock() && self.script.table_renders);
        }
        Ok(self.script.options.contains_key(selector) || self.script.inputs.iter().any(|s| s == selector))
    }

    async fn element_attribute(&self, selector: &str, name: &str) -> BrowserResult<Option<String>> {
        if selector == self.selectors.token && name == "value" {
            return Ok(self.script.token.clone());
        }
        Ok(None)
    }

    async fn element_text(&self, selector: &str) -> BrowserResult<Option<String>> {
        if selector == self.selectors.captcha {
            return Ok(self.script.captcha.clone());
        }
        Ok(None)
    }

    async fn select_option(&self, selector: &str, value: &str) -> BrowserResult<bool> {
        self.counters.fills.fetch_add(1, Ordering::SeqCst);
        let offered = self
            .script
            .options
            .get(selector)
            .is_some_and(|values| values.iter().any(|v| v == value));
        if offered {
            self.counters
                .filled
                .lock()
                .push((selector.to_string(), value.to_string()));
        }
        Ok(offered)
    }

    async fn type_text(&self, selector: &str, text: &str) -> BrowserResult<bool> {
        self.counters.fills.fetch_add(1, Ordering::SeqCst);
        if !self.script.inputs.iter().any(|s| s == selector) {
            return Ok(false);
        }
        self.counters
            .filled
            .lock()
            .push((selector.to_string(), text.to_string()));
        Ok(true)
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        self.counters.clicks.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_click {
            return Err(BrowserError::InteractionFailed {
                selector: selector.to_string(),
                message: "element is not clickable".to_string(),
            });
        }
        if selector == self.selectors.submit {
            *self.submitted.lock() = true;
        }
        Ok(())
    }

    async fn content(&self) -> BrowserResult<String> {
        self.check_alive()?;
        Ok(self.script.results_html.clone())
    }

    async fn close(self: Box<Self>) -> BrowserResult<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fetcher over `script` with settle delays disabled
pub fn fetcher(script: PageScript) -> (CaseFetcher, Arc<Counters>) {
    let manager = FakeSessionManager::new(script);
    let counters = manager.counters();
    let fetcher = CaseFetcher::new(Arc::new(manager), PortalConfig::default(), TimingConfig::immediate());
    (fetcher, counters)
}

/// Results page with a header row followed by `rows`
pub fn results_table(rows: &[&[&str]]) -> String {
    let mut html = String::from(
        "<html><body><table id=\"caseTable\"><thead><tr><th>S.No.</th><th>Case No.</th>\
         <th>Date of Judgment/Order</th><th>Party</th><th>Corrigendum</th></tr></thead><tbody>",
    );
    for row in rows {
        html.push_str("<tr>");
        for cell in *row {
            html.push_str("<td>");
            html.push_str(cell);
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></body></html>");
    html
}

/// Results page the portal renders when it rejects the form
pub fn no_table_page() -> String {
    "<html><body><div class=\"alert alert-danger\">Captcha mismatch</div></body></html>"
        .to_string()
}

/// Results page carrying the portal's empty-table text
pub fn no_data_page() -> String {
    "<html><body><table><thead><tr><th>S.No.</th></tr></thead><tbody><tr>\
     <td colspan=\"5\" class=\"dataTables_empty\">No data available in table</td>\
     </tr></tbody></table></body></html>"
        .to_string()
}
