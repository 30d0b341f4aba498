//! Location → location-code lookup used to auto-fill record codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A many-to-one mapping from a location name to its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRelationship {
    /// Site name.
    #[schema(example = "Baap")]
    pub location: String,
    /// Code the site maps to.
    #[schema(example = "RJ")]
    pub location_code: String,
}

impl LocationRelationship {
    /// Construct a relationship from borrowed parts.
    pub fn new(location: impl Into<String>, location_code: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            location_code: location_code.into(),
        }
    }
}

/// Relationships served when a fiscal year has none stored.
pub fn default_relationships() -> Vec<LocationRelationship> {
    vec![
        LocationRelationship::new("Khavda", "Khavda"),
        LocationRelationship::new("Baap", "RJ"),
        LocationRelationship::new("Essel", "RJ"),
    ]
}

/// Validation error for a relationship batch. `row` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid relationship at row {row}")]
pub struct RelationshipValidationError {
    /// 1-based index of the failing entry.
    pub row: usize,
}

/// Trim and validate a replacement batch.
///
/// A later entry for the same location overrides an earlier one, and the
/// surviving entry keeps the position of the first occurrence.
pub fn normalise_relationships(
    relationships: Vec<LocationRelationship>,
) -> Result<Vec<LocationRelationship>, RelationshipValidationError> {
    let mut normalised: Vec<LocationRelationship> = Vec::with_capacity(relationships.len());
    for (index, relationship) in relationships.into_iter().enumerate() {
        let location = relationship.location.trim();
        let location_code = relationship.location_code.trim();
        if location.is_empty() || location_code.is_empty() {
            return Err(RelationshipValidationError { row: index + 1 });
        }
        match normalised.iter_mut().find(|known| known.location == location) {
            Some(existing) => location_code.clone_into(&mut existing.location_code),
            None => normalised.push(LocationRelationship::new(location, location_code)),
        }
    }
    Ok(normalised)
}

/// Look up the code for `location`, ignoring case and surrounding space.
///
/// # Examples
/// ```
/// use capacity_backend::domain::{code_for, default_relationships};
///
/// let relationships = default_relationships();
/// assert_eq!(code_for(&relationships, "baap"), Some("RJ"));
/// assert_eq!(code_for(&relationships, "Nowhere"), None);
/// ```
pub fn code_for<'a>(relationships: &'a [LocationRelationship], location: &str) -> Option<&'a str> {
    let wanted = location.trim();
    relationships
        .iter()
        .find(|relationship| relationship.location.eq_ignore_ascii_case(wanted))
        .map(|relationship| relationship.location_code.as_str())
}
