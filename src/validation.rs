//! Input validation performed before a fetch is dispatched

use chrono::Datelike;
use serde::Deserialize;
use thiserror::Error;

use crate::types::SearchRequest;
use crate::utils::constants::MIN_FILING_YEAR;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required!")]
    MissingFields,

    #[error("Invalid year format.")]
    InvalidYearFormat,

    #[error("Invalid year. Please select a year between {min} and {max}.")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
}

/// Inclusive range of accepted filing years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// `[1951, max]`, where `max` defaults to the current calendar year
    pub fn with_max(max: Option<i32>) -> Self {
        Self::new(
            MIN_FILING_YEAR,
            max.unwrap_or_else(|| chrono::Utc::now().year()),
        )
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Selectable years, newest first
    pub fn years_descending(&self) -> Vec<i32> {
        (self.min..=self.max).rev().collect()
    }
}

/// Raw search form as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub case_number: String,
    #[serde(default)]
    pub filing_year: String,
}

impl SearchForm {
    pub fn validate(&self, bounds: YearBounds) -> Result<SearchRequest, ValidationError> {
        let case_type = self.case_type.trim();
        let case_number = self.case_number.trim();
        let filing_year = self.filing_year.trim();

        if case_type.is_empty() || case_number.is_empty() || filing_year.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        let year: i32 = filing_year
            .parse()
            .map_err(|_| ValidationError::InvalidYearFormat)?;

        if !bounds.contains(year) {
            return Err(ValidationError::YearOutOfRange {
                year,
                min: bounds.min,
                max: bounds.max,
            });
        }

        Ok(SearchRequest::new(case_type, case_number, year))
    }
}
