//! Results table parsing
//!
//! The portal renders results into an HTML table after submission. Parsing is
//! positional and tolerant: the markup is not versioned, so malformed rows are
//! skipped and partial data is preferred over failing the whole fetch.

use std::sync::LazyLock;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::PortalConfig;
use crate::browser::{Session, wait_for_element};
use crate::types::{CaseRecord, FetchError, FetchStage};

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table").expect("BUG: hardcoded selector 'table' is statically valid")
});

static TR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("tr").expect("BUG: hardcoded selector 'tr' is statically valid")
});

static TD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td").expect("BUG: hardcoded selector 'td' is statically valid")
});

/// Cells a row needs before it is read as a case
const MIN_CELLS: usize = 4;

/// What the results markup contained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsPage {
    /// The portal's "no data available" text was present
    NoDataMarker,
    /// No `<table>` in the document
    NoTable,
    /// The table had nothing after its header row
    NoRows,
    /// Rows that had at least four cells; may be empty if all were malformed
    Rows(Vec<CaseRecord>),
}

impl ResultsPage {
    /// Collapse the three empty outcomes into `None`
    pub fn into_cases(self) -> Option<Vec<CaseRecord>> {
        match self {
            Self::Rows(cases) => Some(cases),
            Self::NoDataMarker | Self::NoTable | Self::NoRows => None,
        }
    }
}

/// Parse results markup into case records
pub fn parse_results_html(html: &str, no_data_marker: &str) -> ResultsPage {
    if !no_data_marker.is_empty() && html.contains(no_data_marker) {
        return ResultsPage::NoDataMarker;
    }

    let document = Html::parse_document(html);

    let Some(table) = document.select(&TABLE_SELECTOR).next() else {
        return ResultsPage::NoTable;
    };

    let rows: Vec<ElementRef<'_>> = table.select(&TR_SELECTOR).skip(1).collect();
    if rows.is_empty() {
        return ResultsPage::NoRows;
    }

    let mut cases = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row.select(&TD_SELECTOR).map(cell_text).collect();

        if cells.len() < MIN_CELLS {
            debug!(
                "Skipping results row {} with {} cells",
                index + 1,
                cells.len()
            );
            continue;
        }

        let mut cells = cells.into_iter();
        cases.push(CaseRecord {
            serial_no: cells.next().unwrap_or_default(),
            case_number_full: cells.next().unwrap_or_default(),
            date_of_judgment: cells.next().unwrap_or_default(),
            parties: cells.next().unwrap_or_default(),
            corrigendum: cells.next().unwrap_or_default(),
        });
    }

    ResultsPage::Rows(cases)
}

/// Text content with whitespace runs collapsed to single spaces
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Wait for the results table, then read it from the live page
///
/// A table that never appears within `timeout` is a `Parse` failure, a browser
/// that stops answering is `Transport`, and an empty result set is `Ok(None)`.
pub async fn parse(
    session: &dyn Session,
    portal: &PortalConfig,
    timeout: Duration,
) -> Result<Option<Vec<CaseRecord>>, FetchError> {
    let table_selector = portal.selectors.results_table.as_str();

    let appeared = wait_for_element(session, table_selector, timeout)
        .await
        .map_err(|e| FetchError::transport(format!("Browser stopped responding: {e}")))?;
    if !appeared {
        return Err(FetchError::new(
            FetchStage::Parse,
            format!(
                "Results table '{}' did not appear within {}ms",
                table_selector,
                timeout.as_millis()
            ),
        ));
    }

    let html = session
        .content()
        .await
        .map_err(|e| FetchError::transport(format!("Failed to read results page: {e}")))?;

    let page = parse_results_html(&html, &portal.no_data_marker);
    match &page {
        ResultsPage::NoDataMarker => info!("Portal reported no data for this search"),
        ResultsPage::NoTable => warn!("Results page has no table"),
        ResultsPage::NoRows => info!("Results table has no data rows"),
        ResultsPage::Rows(cases) => debug!("Parsed {} case rows", cases.len()),
    }

    Ok(page.into_cases())
}
