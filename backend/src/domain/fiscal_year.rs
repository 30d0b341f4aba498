//! Fiscal-year partition key.
//!
//! Every record set, option list, and relationship table is scoped to one
//! fiscal year. Nothing relates across fiscal years.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label used when a request omits the fiscal year on master-data endpoints.
pub const DEFAULT_FISCAL_YEAR: &str = "FY_25";

const MAX_LEN: usize = 32;

/// Validation errors returned when constructing [`FiscalYear`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FiscalYearValidationError {
    /// Blank once trimmed.
    #[error("fiscalYear is required")]
    Empty,
    /// Longer than the storage column allows.
    #[error("fiscalYear must be at most {max} characters")]
    TooLong { max: usize },
    /// Contains characters outside `[A-Za-z0-9_-]`.
    #[error("fiscalYear may only contain letters, digits, '_' or '-'")]
    InvalidCharacters,
}

/// Fiscal-year label such as `FY_25`.
///
/// ## Invariants
/// - Trimmed and non-empty.
/// - ASCII alphanumerics, `_` and `-` only, so the label is safe to use as a
///   fixture file stem.
///
/// # Examples
/// ```
/// use capacity_backend::domain::FiscalYear;
///
/// let fy = FiscalYear::new(" FY_25 ").expect("valid label");
/// assert_eq!(fy.as_str(), "FY_25");
/// assert!(FiscalYear::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalYear(String);

impl FiscalYear {
    /// Validate and construct a fiscal-year label.
    pub fn new(value: impl AsRef<str>) -> Result<Self, FiscalYearValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(FiscalYearValidationError::Empty);
        }
        if trimmed.chars().count() > MAX_LEN {
            return Err(FiscalYearValidationError::TooLong { max: MAX_LEN });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(FiscalYearValidationError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse an optional label, falling back to [`DEFAULT_FISCAL_YEAR`].
    pub fn or_default(value: Option<&str>) -> Result<Self, FiscalYearValidationError> {
        match value {
            Some(raw) if !raw.trim().is_empty() => Self::new(raw),
            _ => Ok(Self::default()),
        }
    }

    /// Borrow the label.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for FiscalYear {
    fn default() -> Self {
        Self(DEFAULT_FISCAL_YEAR.to_owned())
    }
}

impl AsRef<str> for FiscalYear {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for FiscalYear {
    type Error = FiscalYearValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FiscalYear> for String {
    fn from(value: FiscalYear) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", FiscalYearValidationError::Empty)]
    #[case("   ", FiscalYearValidationError::Empty)]
    #[case("FY 25", FiscalYearValidationError::InvalidCharacters)]
    #[case("../FY_25", FiscalYearValidationError::InvalidCharacters)]
    #[case(
        "FY_0123456789012345678901234567890",
        FiscalYearValidationError::TooLong { max: MAX_LEN }
    )]
    fn rejects_invalid_labels(#[case] raw: &str, #[case] expected: FiscalYearValidationError) {
        assert_eq!(FiscalYear::new(raw), Err(expected));
    }

    #[rstest]
    #[case(None, "FY_25")]
    #[case(Some(""), "FY_25")]
    #[case(Some("FY_27"), "FY_27")]
    fn or_default_falls_back_for_missing_values(
        #[case] raw: Option<&str>,
        #[case] expected: &str,
    ) {
        let fy = FiscalYear::or_default(raw).expect("valid label");
        assert_eq!(fy.as_str(), expected);
    }

    #[rstest]
    fn empty_error_matches_handler_message() {
        assert_eq!(
            FiscalYearValidationError::Empty.to_string(),
            "fiscalYear is required"
        );
    }
}
