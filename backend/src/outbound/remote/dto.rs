//! Upstream JSON shapes.
//!
//! The upstream service stores SQLite rows, so flags arrive as `0`/`1` and
//! timestamps as either RFC 3339 or `YYYY-MM-DD HH:MM:SS` in UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{CapacityRecord, DropdownOptions, FiscalYear, TableSnapshot};

#[derive(Debug, Deserialize)]
pub(super) struct BackupListDto {
    #[serde(default)]
    pub(super) backups: Vec<SnapshotDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SnapshotDto {
    #[serde(default)]
    pub(super) id: i64,
    #[serde(alias = "fiscalYear")]
    pub(super) fiscal_year: String,
    #[serde(default)]
    pub(super) data: Vec<CapacityRecord>,
    pub(super) version: i32,
    #[serde(alias = "isDeleted", deserialize_with = "lenient_bool")]
    pub(super) is_deleted: bool,
    #[serde(alias = "createdAt", default)]
    pub(super) created_at: Option<String>,
    #[serde(alias = "updatedAt", default)]
    pub(super) updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SaveResponseDto {
    pub(super) version: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MessageDto {
    #[serde(default)]
    pub(super) message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SaveRequestDto<'a> {
    pub(super) fiscal_year: &'a str,
    pub(super) data: &'a [CapacityRecord],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RestoreRequestDto<'a> {
    pub(super) fiscal_year: &'a str,
    pub(super) version: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OptionsRequestDto<'a> {
    pub(super) fiscal_year: &'a str,
    #[serde(flatten)]
    pub(super) options: &'a DropdownOptions,
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Ok(flag),
        Value::Number(number) => Ok(number.as_i64().is_some_and(|n| n != 0)),
        Value::String(text) => Ok(matches!(text.trim(), "1" | "true" | "TRUE" | "True")),
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean flag, found {other}"
        ))),
    }
}

/// Parse an upstream timestamp; unknown formats yield `None`.
pub(super) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

impl SnapshotDto {
    pub(super) fn into_domain(self) -> Result<TableSnapshot, String> {
        let fiscal_year = FiscalYear::new(&self.fiscal_year)
            .map_err(|err| format!("upstream fiscal year is invalid: {err}"))?;
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_default();
        let updated_at = self
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(created_at);
        Ok(TableSnapshot {
            id: self.id,
            fiscal_year,
            data: self.data,
            version: self.version,
            is_deleted: self.is_deleted,
            created_at,
            updated_at,
        })
    }
}
