//! Named variables: an arbitrary key → JSON value store.
//!
//! Variables are global or scoped to one user; the two namespaces never
//! shadow each other.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

const MAX_KEY_LEN: usize = 128;

/// Validation errors returned when constructing [`VariableKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableKeyValidationError {
    /// Blank once trimmed.
    #[error("key is required")]
    Empty,
    /// Longer than the storage column allows.
    #[error("key must be at most {max} characters")]
    TooLong { max: usize },
}

/// Trimmed, non-empty variable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariableKey(String);

impl VariableKey {
    /// Validate and construct a key.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, VariableKeyValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(VariableKeyValidationError::Empty);
        }
        if trimmed.chars().count() > MAX_KEY_LEN {
            return Err(VariableKeyValidationError::TooLong { max: MAX_KEY_LEN });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for VariableKey {
    type Error = VariableKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VariableKey> for String {
    fn from(value: VariableKey) -> Self {
        value.0
    }
}

/// Owner of a variable: `None` is the global namespace.
pub type VariableScope = Option<UserId>;

/// Whether a set operation created or replaced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// No value existed before.
    Created,
    /// An existing value was replaced.
    Updated,
}
