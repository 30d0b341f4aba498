//! Versioned record sets.
//!
//! Each fiscal year has at most one active snapshot. Saving archives the
//! active snapshot and inserts a replacement with the next version number;
//! archived snapshots form the backup history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CapacityRecord, FiscalYear};

/// One stored version of a fiscal year's record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    /// Storage row identifier.
    pub id: i64,
    /// Fiscal year the snapshot belongs to.
    #[schema(value_type = String, example = "FY_25")]
    pub fiscal_year: FiscalYear,
    /// Rows of this version.
    pub data: Vec<CapacityRecord>,
    /// Monotonic per fiscal year, starting at 1.
    pub version: i32,
    /// `true` for archived versions.
    pub is_deleted: bool,
    /// When this version was written.
    pub created_at: DateTime<Utc>,
    /// Last change, e.g. when it was archived.
    pub updated_at: DateTime<Utc>,
}

/// Outcome of soft-deleting a fiscal year's active record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The active snapshot was archived.
    Deleted,
    /// History exists but nothing was active.
    AlreadyDeleted,
    /// The fiscal year has never been saved.
    NotFound,
}

/// Next version number given the highest stored one.
///
/// # Examples
/// ```
/// use capacity_backend::domain::next_version;
///
/// assert_eq!(next_version(None), 1);
/// assert_eq!(next_version(Some(4)), 5);
/// ```
pub fn next_version(current_max: Option<i32>) -> i32 {
    current_max.map_or(1, |max| max.saturating_add(1))
}
