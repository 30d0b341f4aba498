//! Shared validation helpers for inbound HTTP adapters.
//!
//! Query and body fields arrive as optional strings; these helpers turn them
//! into domain values or `400` errors with a `details.field` hint.

use serde_json::json;

use crate::domain::{Error, FiscalYear, FiscalYearValidationError, UserId, VariableScope};

const FISCAL_YEAR_FIELD: &str = "fiscalYear";

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn fiscal_year_error(err: &FiscalYearValidationError) -> Error {
    let code = match err {
        FiscalYearValidationError::Empty => "missing_field",
        FiscalYearValidationError::TooLong { .. } | FiscalYearValidationError::InvalidCharacters => {
            "invalid_fiscal_year"
        }
    };
    field_error(FISCAL_YEAR_FIELD, code, err.to_string())
}

/// Parse a fiscal year that the caller must provide.
pub(crate) fn required_fiscal_year(raw: Option<&str>) -> Result<FiscalYear, Error> {
    FiscalYear::new(raw.unwrap_or_default()).map_err(|err| fiscal_year_error(&err))
}

/// Parse an optional fiscal year, defaulting when absent or blank.
pub(crate) fn fiscal_year_or_default(raw: Option<&str>) -> Result<FiscalYear, Error> {
    FiscalYear::or_default(raw).map_err(|err| fiscal_year_error(&err))
}

/// Parse the optional `userId` that scopes a variable.
pub(crate) fn variable_scope(raw: Option<&str>) -> Result<VariableScope, Error> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => UserId::new(value)
            .map(Some)
            .map_err(|err| field_error("userId", "invalid_uuid", err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some("  "))]
    fn required_fiscal_year_rejects_absence(#[case] raw: Option<&str>) {
        let err = required_fiscal_year(raw).expect_err("missing fiscal year");
        assert_eq!(err.message(), "fiscalYear is required");
        assert_eq!(
            err.details().and_then(|d| d.get("code")),
            Some(&json!("missing_field"))
        );
    }

    #[rstest]
    fn default_fiscal_year_applies_when_blank() {
        let fy = fiscal_year_or_default(Some("")).expect("default");
        assert_eq!(fy.as_str(), "FY_25");
    }

    #[rstest]
    fn malformed_fiscal_years_are_flagged() {
        let err = fiscal_year_or_default(Some("FY 25")).expect_err("space");
        assert_eq!(
            err.details().and_then(|d| d.get("code")),
            Some(&json!("invalid_fiscal_year"))
        );
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("3fa85f64-5717-4562-b3fc-2c963f66afa6"), true)]
    #[case(Some("nope"), false)]
    fn variable_scope_parses_user_ids(#[case] raw: Option<&str>, #[case] ok: bool) {
        assert_eq!(variable_scope(raw).is_ok(), ok);
    }
}
