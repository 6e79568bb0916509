//! Case search domain types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated search against the portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Portal case type code, e.g. "S" for CS(OS)
    pub case_type: String,
    pub case_number: String,
    pub filing_year: i32,
}

impl SearchRequest {
    pub fn new(case_type: impl Into<String>, case_number: impl Into<String>, filing_year: i32) -> Self {
        Self {
            case_type: case_type.into(),
            case_number: case_number.into(),
            filing_year,
        }
    }

    /// Human readable identifier, e.g. `S 10/2023`
    pub fn display_id(&self) -> String {
        format!("{} {}/{}", self.case_type, self.case_number, self.filing_year)
    }
}

/// One row of the portal's results table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub serial_no: String,
    pub case_number_full: String,
    pub date_of_judgment: String,
    pub parties: String,
    /// Empty when the row has no fifth cell
    #[serde(default)]
    pub corrigendum: String,
}

/// Records parsed from one successful fetch
///
/// Deserializing rebuilds the counters from `cases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSearchResult")]
pub struct CaseSearchResult {
    cases: Vec<CaseRecord>,
    total_cases: usize,
    search_successful: bool,
}

#[derive(Deserialize)]
struct StoredSearchResult {
    #[serde(default)]
    cases: Vec<CaseRecord>,
}

impl From<StoredSearchResult> for CaseSearchResult {
    fn from(stored: StoredSearchResult) -> Self {
        Self::new(stored.cases)
    }
}

impl CaseSearchResult {
    pub fn new(cases: Vec<CaseRecord>) -> Self {
        let total_cases = cases.len();
        Self {
            cases,
            total_cases,
            search_successful: true,
        }
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn total_cases(&self) -> usize {
        self.total_cases
    }

    pub fn first(&self) -> Option<&CaseRecord> {
        self.cases.first()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Pipeline stage at which a fetch stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchStage {
    /// Browser could not be launched or the portal could not be reached
    Transport,
    /// Anti-forgery token or CAPTCHA missing from the search page
    TokenExtraction,
    /// A form field or option could not be set
    FormFill,
    /// The submit control could not be clicked
    Submit,
    /// Results table never appeared
    Parse,
    /// The portal answered with an empty result set
    NoResults,
}

impl FetchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "TRANSPORT",
            Self::TokenExtraction => "TOKEN_EXTRACTION",
            Self::FormFill => "FORM_FILL",
            Self::Submit => "SUBMIT",
            Self::Parse => "PARSE",
            Self::NoResults => "NO_RESULTS",
        }
    }
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a fetch produced no records
///
/// `NoResults` is an expected outcome ("case not found"), every other stage
/// means the portal or the browser misbehaved.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{stage}: {message}")]
pub struct FetchError {
    pub stage: FetchStage,
    pub message: String,
}

impl FetchError {
    pub fn new(stage: FetchStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FetchStage::Transport, message)
    }

    pub fn no_results() -> Self {
        Self::new(FetchStage::NoResults, "No case data found or case doesn't exist")
    }

    pub fn is_no_results(&self) -> bool {
        self.stage == FetchStage::NoResults
    }
}

pub type FetchResult = Result<CaseSearchResult, FetchError>;

/// Case type option offered by the portal's search form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaseType {
    #[serde(rename = "value")]
    pub code: &'static str,
    #[serde(rename = "text")]
    pub label: &'static str,
}

pub const CASE_TYPES: &[CaseType] = &[
    CaseType { code: "S", label: "CS(OS)" },
    CaseType { code: "CW", label: "W.P.(C)" },
    CaseType { code: "CRLA", label: "CRL.A." },
    CaseType { code: "FAO", label: "FAO" },
    CaseType { code: "RFA", label: "RFA" },
    CaseType { code: "LPA", label: "LPA" },
    CaseType { code: "CAA", label: "CA" },
    CaseType { code: "MAT", label: "MAT." },
    CaseType { code: "CRLMA", label: "CRL.M.A." },
    CaseType { code: "CMA", label: "CM APPL." },
];

pub fn case_types() -> &'static [CaseType] {
    CASE_TYPES
}
