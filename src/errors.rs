//! Error type shared by the rate tables, the calculators and the exporters.
//!
//! Input and lookup problems are recoverable: the caller reports them and
//! lets the user correct the offending value. Load errors happen at startup
//! and end the process.

use serde::Serialize;
use thiserror::Error;

pub type EstimateResult<T> = Result<T, EstimateError>;

#[derive(Error, Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// No rate row for the (year, location) pair in the selected table.
    #[error("No {quality} rates for {location} in {year}")]
    LookupMiss {
        year: i32,
        location: String,
        quality: String,
    },

    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown currency: {code} (expected SAR, AED or USD)")]
    UnknownCurrency { code: String },

    /// The benchmark configuration has no multiplier for the location.
    #[error("No city multiplier configured for {location}")]
    UnknownCityMultiplier { location: String },

    #[error("Failed to load rate table '{path}': {reason}")]
    RateTableLoad { path: String, reason: String },

    #[error("Duplicate rate row for {location} in {year} in '{path}'")]
    DuplicateRow {
        path: String,
        year: i32,
        location: String,
    },

    #[error("Configuration error in '{path}': {reason}")]
    Config { path: String, reason: String },

    #[error("Export to '{path}' failed: {reason}")]
    Export { path: String, reason: String },

    #[error("PDF rendering failed: {reason}")]
    Pdf { reason: String },
}

impl EstimateError {
    pub fn lookup_miss(year: i32, location: impl Into<String>, quality: impl Into<String>) -> Self {
        EstimateError::LookupMiss {
            year,
            location: location.into(),
            quality: quality.into(),
        }
    }

    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn rate_table_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::RateTableLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn export(path: impl Into<String>, reason: impl ToString) -> Self {
        EstimateError::Export {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the user can fix the problem by changing an input value.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EstimateError::LookupMiss { .. }
                | EstimateError::InvalidInput { .. }
                | EstimateError::UnknownCurrency { .. }
                | EstimateError::UnknownCityMultiplier { .. }
                | EstimateError::Export { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::LookupMiss { .. } => "LOOKUP_MISS",
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::UnknownCurrency { .. } => "UNKNOWN_CURRENCY",
            EstimateError::UnknownCityMultiplier { .. } => "UNKNOWN_CITY_MULTIPLIER",
            EstimateError::RateTableLoad { .. } => "RATE_TABLE_LOAD",
            EstimateError::DuplicateRow { .. } => "DUPLICATE_ROW",
            EstimateError::Config { .. } => "CONFIG",
            EstimateError::Export { .. } => "EXPORT",
            EstimateError::Pdf { .. } => "PDF",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_miss_message_names_the_pair() {
        let err = EstimateError::lookup_miss(2030, "Riyadh", "Standard");
        assert_eq!(err.to_string(), "No Standard rates for Riyadh in 2030");
        assert_eq!(err.error_code(), "LOOKUP_MISS");
        assert!(err.is_recoverable());
    }

    #[test]
    fn load_errors_are_fatal() {
        let err = EstimateError::rate_table_load("missing.csv", "not found");
        assert!(!err.is_recoverable());
        assert_eq!(err.error_code(), "RATE_TABLE_LOAD");
    }

    #[test]
    fn serializes_with_tag() {
        let err = EstimateError::invalid_input("area", "-5", "must be positive");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "InvalidInput");
        assert_eq!(json["details"]["field"], "area");
    }
}
