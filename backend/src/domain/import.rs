//! Spreadsheet-export fixtures → capacity records.
//!
//! Fixture rows use the column headings of the source workbook ("Sl No",
//! "PPA/Merchant", "PSS -", ...). Numbers may arrive as strings.

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;
use utoipa::ToSchema;

use super::{CapacityRecord, FiscalYear, parse_records};

const PSS_KEYS: [&str; 3] = ["PSS", "PSS -", "PSS-"];

/// Per-fiscal-year outcome of an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// Fiscal year named by the fixture file.
    #[schema(value_type = String)]
    pub fiscal_year: FiscalYear,
    /// Human-readable result line.
    pub message: String,
    /// Rows stored.
    pub count: usize,
    /// Rows dropped because they failed record validation.
    pub skipped: usize,
    /// Version created by the import, if any rows were stored.
    pub version: Option<i32>,
}

fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

fn text(item: &Map<String, Value>, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        _ => String::new(),
    }
}

/// Map one fixture row onto the record payload shape. `index` is 0-based.
///
/// Missing capacity becomes 0; missing solar/wind become null.
pub fn convert_fixture_row(item: &Value, index: usize) -> Value {
    let empty = Map::new();
    let item = item.as_object().unwrap_or(&empty);
    let position = index as u64 + 1;
    let sno = item
        .get("Sl No")
        .and_then(|value| lenient_number(Some(value)))
        .filter(|number| *number >= 1.0 && number.fract() == 0.0)
        .map_or(json!(position), |number| json!(number as u64));
    let pss = PSS_KEYS
        .iter()
        .map(|key| text(item, key))
        .find(|value| !value.is_empty())
        .unwrap_or_default();

    json!({
        "id": position,
        "sno": sno,
        "capacity": lenient_number(item.get("Capacity")).unwrap_or_default(),
        "group": text(item, "Group"),
        "ppaMerchant": text(item, "PPA/Merchant"),
        "type": text(item, "Type"),
        "solar": lenient_number(item.get("Solar")),
        "wind": lenient_number(item.get("Wind")),
        "spv": text(item, "SPV"),
        "locationCode": text(item, "Location Code"),
        "location": text(item, "Location"),
        "pss": pss,
        "connectivity": text(item, "Connectivity"),
    })
}

/// Convert fixture rows, skipping rows that fail validation.
///
/// Returns the normalised records and the number of skipped rows.
pub fn convert_fixture_rows(items: &[Value]) -> (Vec<CapacityRecord>, usize) {
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (index, item) in items.iter().enumerate() {
        let row = convert_fixture_row(item, index);
        match parse_records(std::slice::from_ref(&row)) {
            Ok(parsed) => records.extend(parsed.into_iter().map(CapacityRecord::normalised)),
            Err(error) => {
                debug!(row = index + 1, %error, "skipping fixture row");
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GenerationType;
    use rstest::rstest;

    #[rstest]
    fn maps_workbook_headings() {
        let row = convert_fixture_row(
            &json!({
                "Sl No": 7,
                "Capacity": "150.5",
                "Group": "AGEL",
                "PPA/Merchant": "Merchant",
                "Type": "Wind",
                "Solar": "n/a",
                "Wind": 150.5,
                "SPV": "AGEL Wind",
                "Location Code": "RJ",
                "Location": "Baap",
                "PSS -": "12",
                "Connectivity": "CTU"
            }),
            3,
        );
        assert_eq!(row["id"], json!(4));
        assert_eq!(row["sno"], json!(7));
        assert_eq!(row["capacity"], json!(150.5));
        assert_eq!(row["solar"], Value::Null);
        assert_eq!(row["pss"], json!("12"));
        assert_eq!(row["ppaMerchant"], json!("Merchant"));
    }

    #[rstest]
    #[case(json!({ "PSS": "1", "PSS-": "2" }), "1")]
    #[case(json!({ "PSS-": "2" }), "2")]
    #[case(json!({ "PSS": "", "PSS -": "3" }), "3")]
    #[case(json!({}), "")]
    fn pss_falls_back_through_heading_variants(#[case] item: Value, #[case] expected: &str) {
        assert_eq!(convert_fixture_row(&item, 0)["pss"], json!(expected));
    }

    #[rstest]
    fn missing_serial_number_defaults_to_position() {
        let row = convert_fixture_row(&json!({ "Sl No": null }), 9);
        assert_eq!(row["sno"], json!(10));
    }

    #[rstest]
    fn conversion_skips_rows_that_fail_validation() {
        let items = vec![
            json!({
                "Capacity": 50,
                "Group": "ACL",
                "PPA/Merchant": "PPA",
                "Type": "Hybrid",
                "Solar": 20,
                "Wind": 30,
                "SPV": "acl hybrid",
                "Location": "Essel",
                "PSS": "PSS-9"
            }),
            json!({ "Capacity": 10, "Type": "" }),
        ];
        let (records, skipped) = convert_fixture_rows(&items);
        assert_eq!(skipped, 1);
        let record = records.first().expect("one record");
        assert_eq!(record.generation_type, GenerationType::Hybrid);
        assert_eq!(record.solar, None);
        assert_eq!(record.spv, "ACL HYBRID");
        assert_eq!(record.pss, "PSS - 9");
    }
}
