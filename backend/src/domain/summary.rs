//! Filtered totals over a record set, as shown under the record table.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::{CapacityRecord, GenerationType};

/// Exact-match filters; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    /// Exact group.
    pub group: Option<String>,
    /// Exact PPA or merchant label.
    pub ppa_merchant: Option<String>,
    /// Matched case-insensitively; blank means no filter.
    #[serde(rename = "type", default, deserialize_with = "optional_generation_type")]
    pub generation_type: Option<GenerationType>,
    /// Exact location code.
    pub location_code: Option<String>,
    /// Exact location.
    pub location: Option<String>,
    /// Exact substation.
    pub pss: Option<String>,
    /// Exact connectivity.
    pub connectivity: Option<String>,
}

fn optional_generation_type<'de, D>(deserializer: D) -> Result<Option<GenerationType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse::<GenerationType>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn matches_text(filter: Option<&str>, value: &str) -> bool {
    filter.is_none_or(|wanted| wanted.trim().is_empty() || wanted.trim() == value)
}

impl RecordFilter {
    /// Whether `record` passes every populated filter.
    pub fn matches(&self, record: &CapacityRecord) -> bool {
        matches_text(self.group.as_deref(), &record.group)
            && matches_text(self.ppa_merchant.as_deref(), &record.ppa_merchant)
            && self
                .generation_type
                .is_none_or(|kind| kind == record.generation_type)
            && matches_text(self.location_code.as_deref(), &record.location_code)
            && matches_text(self.location.as_deref(), &record.location)
            && matches_text(self.pss.as_deref(), &record.pss)
            && matches_text(self.connectivity.as_deref(), &record.connectivity)
    }
}

/// Row count and MW totals for the filtered rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapacitySummary {
    /// Rows that passed the filter.
    pub row_count: usize,
    /// Total capacity in MW.
    pub capacity: f64,
    /// Total solar MW.
    pub solar: f64,
    /// Total wind MW.
    pub wind: f64,
}

impl CapacitySummary {
    /// Sum the rows selected by `filter`. Missing solar/wind values count as 0.
    pub fn compute<'a>(
        records: impl IntoIterator<Item = &'a CapacityRecord>,
        filter: &RecordFilter,
    ) -> Self {
        records
            .into_iter()
            .filter(|record| filter.matches(record))
            .fold(Self::default(), |mut totals, record| {
                totals.row_count += 1;
                totals.capacity += record.capacity;
                totals.solar += record.solar.unwrap_or_default();
                totals.wind += record.wind.unwrap_or_default();
                totals
            })
    }
}
