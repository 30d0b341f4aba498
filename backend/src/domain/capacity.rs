//! Capacity records: one row per solar/wind project.
//!
//! Inbound payloads arrive as loosely typed JSON. [`parse_records`] checks
//! each row's field types and builds typed [`CapacityRecord`] values, and
//! [`CapacityRecord::normalised`] applies the input conventions shared by
//! every storage backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

const PSS_PREFIX: &str = "PSS";
const PSS_SEPARATOR: &str = " - ";

/// Generation technology of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum GenerationType {
    /// Solar only.
    Solar,
    /// Wind only.
    Wind,
    /// Solar and wind; the row keeps only its wind share.
    Hybrid,
}

impl GenerationType {
    /// Canonical label used in JSON payloads and option lists.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solar => "Solar",
            Self::Wind => "Wind",
            Self::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for GenerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label does not name a [`GenerationType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown generation type: {0}")]
pub struct UnknownGenerationType(pub String);

impl FromStr for GenerationType {
    type Err = UnknownGenerationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        [Self::Solar, Self::Wind, Self::Hybrid]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownGenerationType(trimmed.to_owned()))
    }
}

/// A single project row within a fiscal year's record set.
///
/// ## Invariants (after [`CapacityRecord::normalised`])
/// - `spv` is upper-cased.
/// - `pss` is empty or starts with `PSS - `.
/// - Solar rows carry no `wind`; Wind and Hybrid rows carry no `solar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapacityRecord {
    /// Row identifier, unique within a record set.
    pub id: u64,
    /// Serial number shown in the first column.
    pub sno: u64,
    /// Installed capacity in MW.
    pub capacity: f64,
    /// Owning group, e.g. `AGEL`.
    pub group: String,
    /// `PPA` or `Merchant`.
    pub ppa_merchant: String,
    /// Serialised as `type`.
    #[serde(rename = "type")]
    pub generation_type: GenerationType,
    /// Solar share in MW; `None` for wind and hybrid rows.
    pub solar: Option<f64>,
    /// Wind share in MW; `None` for solar rows.
    pub wind: Option<f64>,
    /// Special purpose vehicle, upper-cased.
    pub spv: String,
    /// Code of `location`, e.g. `RJ`.
    pub location_code: String,
    /// Site name, e.g. `Baap`.
    pub location: String,
    /// Substation as `PSS - <id>`, or empty.
    pub pss: String,
    /// Grid connectivity, e.g. `CTU`.
    pub connectivity: String,
}

impl CapacityRecord {
    /// Apply input conventions: trimmed text, upper-cased SPV, prefixed PSS
    /// and mutually exclusive solar/wind values.
    #[must_use]
    pub fn normalised(mut self) -> Self {
        self.group = self.group.trim().to_owned();
        self.ppa_merchant = self.ppa_merchant.trim().to_owned();
        self.spv = self.spv.trim().to_uppercase();
        self.location_code = self.location_code.trim().to_owned();
        self.location = self.location.trim().to_owned();
        self.connectivity = self.connectivity.trim().to_owned();
        self.pss = format_pss(&self.pss);
        match self.generation_type {
            GenerationType::Solar => self.wind = None,
            GenerationType::Wind | GenerationType::Hybrid => self.solar = None,
        }
        self
    }
}

/// Format a substation identifier as `PSS - <id>`.
///
/// Handles `PSS-12`, `PSS -12`, `pss - 12` and bare `12`. Blank input stays
/// blank.
///
/// # Examples
/// ```
/// use capacity_backend::domain::format_pss;
///
/// assert_eq!(format_pss("PSS-12"), "PSS - 12");
/// assert_eq!(format_pss("7"), "PSS - 7");
/// assert_eq!(format_pss(""), "");
/// ```
pub fn format_pss(raw: &str) -> String {
    let trimmed = raw.trim();
    let rest = match trimmed.get(..PSS_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(PSS_PREFIX) => trimmed
            .get(PSS_PREFIX.len()..)
            .unwrap_or_default()
            .trim_start(),
        _ => trimmed,
    };
    let rest = rest.strip_prefix('-').unwrap_or(rest).trim();
    if rest.is_empty() {
        String::new()
    } else {
        format!("{PSS_PREFIX}{PSS_SEPARATOR}{rest}")
    }
}

/// Field-level reason a row failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowViolation {
    /// The row was not a JSON object.
    #[error("Row must be an object")]
    NotAnObject,
    /// A required field was absent or had the wrong type.
    #[error("Invalid or missing {0}")]
    InvalidOrMissing(&'static str),
    /// A numeric field held a non-finite or negative value.
    #[error("Invalid {0} value")]
    InvalidNumber(&'static str),
}

/// Validation error for a batch of rows. `row` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid data at row {row}: {violation}")]
pub struct RecordValidationError {
    /// 1-based index of the failing row.
    pub row: usize,
    /// What was wrong with it.
    pub violation: RowViolation,
}

/// Validate raw JSON rows and build typed records.
///
/// The first failing row rejects the whole batch.
///
/// # Examples
/// ```
/// use capacity_backend::domain::parse_records;
/// use serde_json::json;
///
/// let err = parse_records(&[json!({ "id": 0 })]).expect_err("id must be positive");
/// assert_eq!(err.to_string(), "Invalid data at row 1: Invalid or missing id");
/// ```
pub fn parse_records(rows: &[Value]) -> Result<Vec<CapacityRecord>, RecordValidationError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            parse_record(row).map_err(|violation| RecordValidationError {
                row: index + 1,
                violation,
            })
        })
        .collect()
}

fn parse_record(row: &Value) -> Result<CapacityRecord, RowViolation> {
    let fields = row.as_object().ok_or(RowViolation::NotAnObject)?;
    Ok(CapacityRecord {
        id: positive_integer(fields, "id")?,
        sno: positive_integer(fields, "sno")?,
        capacity: non_negative(fields, "capacity")?,
        group: non_empty_string(fields, "group")?,
        ppa_merchant: non_empty_string(fields, "ppaMerchant")?,
        generation_type: fields
            .get("type")
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse().ok())
            .ok_or(RowViolation::InvalidOrMissing("type"))?,
        solar: optional_number(fields, "solar")?,
        wind: optional_number(fields, "wind")?,
        spv: string(fields, "spv")?,
        location_code: string(fields, "locationCode")?,
        location: string(fields, "location")?,
        pss: string(fields, "pss")?,
        connectivity: string(fields, "connectivity")?,
    })
}

fn positive_integer(fields: &Map<String, Value>, name: &'static str) -> Result<u64, RowViolation> {
    fields
        .get(name)
        .and_then(Value::as_u64)
        .filter(|value| *value > 0)
        .ok_or(RowViolation::InvalidOrMissing(name))
}

fn non_negative(fields: &Map<String, Value>, name: &'static str) -> Result<f64, RowViolation> {
    fields
        .get(name)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or(RowViolation::InvalidOrMissing(name))
}

fn optional_number(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<f64>, RowViolation> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|number| number.is_finite() && *number >= 0.0)
            .map(Some)
            .ok_or(RowViolation::InvalidNumber(name)),
    }
}

fn non_empty_string(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<String, RowViolation> {
    string(fields, name).and_then(|value| {
        if value.trim().is_empty() {
            Err(RowViolation::InvalidOrMissing(name))
        } else {
            Ok(value)
        }
    })
}

fn string(fields: &Map<String, Value>, name: &'static str) -> Result<String, RowViolation> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(RowViolation::InvalidOrMissing(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn valid_row() -> Value {
        json!({
            "id": 1,
            "sno": 1,
            "capacity": 250.5,
            "group": "AGEL",
            "ppaMerchant": "PPA",
            "type": "Solar",
            "solar": 250.5,
            "wind": null,
            "spv": "agel renewables",
            "locationCode": "Khavda",
            "location": "Khavda",
            "pss": "PSS-4",
            "connectivity": "CTU"
        })
    }

    fn with_field(mut row: Value, name: &str, value: Value) -> Value {
        if let Some(fields) = row.as_object_mut() {
            fields.insert(name.to_owned(), value);
        }
        row
    }

    fn without_field(mut row: Value, name: &str) -> Value {
        if let Some(fields) = row.as_object_mut() {
            fields.remove(name);
        }
        row
    }

    #[rstest]
    fn parses_a_valid_row(valid_row: Value) {
        let records = parse_records(&[valid_row]).expect("valid row");
        let record = records.first().expect("one record");
        assert_eq!(record.generation_type, GenerationType::Solar);
        assert_eq!(record.ppa_merchant, "PPA");
        assert_eq!(record.solar, Some(250.5));
    }

    #[rstest]
    #[case("id", json!(0), "Invalid or missing id")]
    #[case("id", json!("1"), "Invalid or missing id")]
    #[case("sno", json!(-2), "Invalid or missing sno")]
    #[case("capacity", json!(-1.0), "Invalid or missing capacity")]
    #[case("group", json!("  "), "Invalid or missing group")]
    #[case("ppaMerchant", json!(5), "Invalid or missing ppaMerchant")]
    #[case("type", json!("Tidal"), "Invalid or missing type")]
    #[case("solar", json!("12"), "Invalid solar value")]
    #[case("wind", json!(-3), "Invalid wind value")]
    #[case("spv", json!(null), "Invalid or missing spv")]
    fn reports_the_failing_field(
        valid_row: Value,
        #[case] field: &str,
        #[case] value: Value,
        #[case] reason: &str,
    ) {
        let bad = with_field(valid_row.clone(), field, value);
        let err = parse_records(&[valid_row, bad]).expect_err("second row is invalid");
        assert_eq!(err.row, 2);
        assert_eq!(err.to_string(), format!("Invalid data at row 2: {reason}"));
    }

    #[rstest]
    fn missing_connectivity_is_rejected(valid_row: Value) {
        let err = parse_records(&[without_field(valid_row, "connectivity")])
            .expect_err("connectivity is required");
        assert_eq!(
            err.violation,
            RowViolation::InvalidOrMissing("connectivity")
        );
    }

    #[rstest]
    fn non_object_rows_are_rejected() {
        let err = parse_records(&[json!([1, 2])]).expect_err("arrays are not rows");
        assert_eq!(err.violation, RowViolation::NotAnObject);
    }

    #[rstest]
    #[case("solar")]
    #[case("SOLAR")]
    #[case(" hybrid ")]
    fn generation_type_parses_case_insensitively(#[case] raw: &str) {
        assert!(raw.parse::<GenerationType>().is_ok());
    }

    #[rstest]
    #[case("PSS - 4", "PSS - 4")]
    #[case("PSS-4", "PSS - 4")]
    #[case("PSS -4", "PSS - 4")]
    #[case("pss- 4", "PSS - 4")]
    #[case("  Bhuj-II ", "PSS - Bhuj-II")]
    #[case("PSS -", "")]
    #[case("   ", "")]
    fn formats_pss_identifiers(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(format_pss(raw), expected);
    }

    #[rstest]
    fn normalisation_upper_cases_spv_and_prefixes_pss(valid_row: Value) {
        let record = parse_records(&[valid_row])
            .expect("valid row")
            .remove(0)
            .normalised();
        assert_eq!(record.spv, "AGEL RENEWABLES");
        assert_eq!(record.pss, "PSS - 4");
    }

    #[rstest]
    #[case("Solar", Some(10.0), None)]
    #[case("Wind", None, Some(20.0))]
    #[case("Hybrid", None, Some(20.0))]
    fn normalisation_keeps_only_the_matching_generation_value(
        valid_row: Value,
        #[case] kind: &str,
        #[case] solar: Option<f64>,
        #[case] wind: Option<f64>,
    ) {
        let row = with_field(
            with_field(
                with_field(valid_row, "type", json!(kind)),
                "solar",
                json!(10.0),
            ),
            "wind",
            json!(20.0),
        );
        let record = parse_records(&[row])
            .expect("valid row")
            .remove(0)
            .normalised();
        assert_eq!(record.solar, solar);
        assert_eq!(record.wind, wind);
    }

    #[rstest]
    fn serialises_type_and_camel_case_keys(valid_row: Value) {
        let record = parse_records(&[valid_row])
            .expect("valid row")
            .remove(0)
            .normalised();
        let value = serde_json::to_value(&record).expect("serialise record");
        assert_eq!(value.get("type"), Some(&json!("Solar")));
        assert_eq!(value.get("locationCode"), Some(&json!("Khavda")));
        assert_eq!(value.get("wind"), Some(&Value::Null));
    }
}
