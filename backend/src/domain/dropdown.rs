//! Dropdown master data: the editable value lists offered by the record form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// The six independent option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OptionCategory {
    /// `groups`
    Groups,
    /// `ppaMerchants`
    PpaMerchants,
    /// `types`
    Types,
    /// `locationCodes`
    LocationCodes,
    /// `locations`
    Locations,
    /// `connectivities`
    Connectivities,
}

impl OptionCategory {
    /// Every category, in payload order.
    pub const ALL: [Self; 6] = [
        Self::Groups,
        Self::PpaMerchants,
        Self::Types,
        Self::LocationCodes,
        Self::Locations,
        Self::Connectivities,
    ];

    /// The camelCase list name used in payloads and storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groups => "groups",
            Self::PpaMerchants => "ppaMerchants",
            Self::Types => "types",
            Self::LocationCodes => "locationCodes",
            Self::Locations => "locations",
            Self::Connectivities => "connectivities",
        }
    }
}

impl fmt::Display for OptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised list name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown option type: {0}")]
pub struct UnknownOptionCategory(pub String);

impl FromStr for OptionCategory {
    type Err = UnknownOptionCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == trimmed)
            .ok_or_else(|| UnknownOptionCategory(trimmed.to_owned()))
    }
}

/// Option lists for one fiscal year.
///
/// ## Invariants
/// - Values are trimmed, non-empty and unique within a list.
/// - List order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DropdownOptions {
    /// Group names.
    #[serde(default)]
    pub groups: Vec<String>,
    /// PPA or merchant labels.
    #[serde(default)]
    pub ppa_merchants: Vec<String>,
    /// Generation types.
    #[serde(default)]
    pub types: Vec<String>,
    /// Location codes.
    #[serde(default)]
    pub location_codes: Vec<String>,
    /// Location names.
    #[serde(default)]
    pub locations: Vec<String>,
    /// Connectivity labels.
    #[serde(default)]
    pub connectivities: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

impl Default for DropdownOptions {
    fn default() -> Self {
        Self {
            groups: owned(&["AGEL", "ACL"]),
            ppa_merchants: owned(&["PPA", "Merchant"]),
            types: owned(&["Solar", "Wind", "Hybrid"]),
            location_codes: owned(&["Khavda", "RJ"]),
            locations: owned(&["Khavda", "Baap", "Essel"]),
            connectivities: owned(&["CTU"]),
        }
    }
}

impl DropdownOptions {
    /// Lists with no values at all.
    pub fn empty() -> Self {
        Self {
            groups: Vec::new(),
            ppa_merchants: Vec::new(),
            types: Vec::new(),
            location_codes: Vec::new(),
            locations: Vec::new(),
            connectivities: Vec::new(),
        }
    }

    /// Borrow the list for `category`.
    pub fn values(&self, category: OptionCategory) -> &[String] {
        match category {
            OptionCategory::Groups => &self.groups,
            OptionCategory::PpaMerchants => &self.ppa_merchants,
            OptionCategory::Types => &self.types,
            OptionCategory::LocationCodes => &self.location_codes,
            OptionCategory::Locations => &self.locations,
            OptionCategory::Connectivities => &self.connectivities,
        }
    }

    fn values_mut(&mut self, category: OptionCategory) -> &mut Vec<String> {
        match category {
            OptionCategory::Groups => &mut self.groups,
            OptionCategory::PpaMerchants => &mut self.ppa_merchants,
            OptionCategory::Types => &mut self.types,
            OptionCategory::LocationCodes => &mut self.location_codes,
            OptionCategory::Locations => &mut self.locations,
            OptionCategory::Connectivities => &mut self.connectivities,
        }
    }

    /// Trim values and drop blanks and duplicates, keeping first-seen order.
    #[must_use]
    pub fn normalised(mut self) -> Self {
        for category in OptionCategory::ALL {
            let list = self.values_mut(category);
            let mut seen: Vec<String> = Vec::with_capacity(list.len());
            for value in list.drain(..) {
                let trimmed = value.trim();
                if !trimmed.is_empty() && !seen.iter().any(|known| known == trimmed) {
                    seen.push(trimmed.to_owned());
                }
            }
            *list = seen;
        }
        self
    }

    /// Append `value` to `category` unless already present.
    ///
    /// Returns `true` when the list changed.
    ///
    /// # Examples
    /// ```
    /// use capacity_backend::domain::{DropdownOptions, OptionCategory};
    ///
    /// let mut options = DropdownOptions::default();
    /// assert!(options.add(OptionCategory::Groups, "AGL"));
    /// assert!(!options.add(OptionCategory::Groups, " AGL "));
    /// ```
    pub fn add(&mut self, category: OptionCategory, value: &str) -> bool {
        let trimmed = value.trim();
        let list = self.values_mut(category);
        if trimmed.is_empty() || list.iter().any(|known| known == trimmed) {
            return false;
        }
        list.push(trimmed.to_owned());
        true
    }

    /// Iterate `(category, value)` pairs in payload order.
    pub fn entries(&self) -> impl Iterator<Item = (OptionCategory, &str)> + '_ {
        OptionCategory::ALL.into_iter().flat_map(move |category| {
            self.values(category)
                .iter()
                .map(move |value| (category, value.as_str()))
        })
    }

    /// Rebuild option lists from stored `(list name, value)` pairs.
    ///
    /// Unknown list names are skipped and returned so callers can log them.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> (Self, Vec<String>) {
        let mut options = Self::empty();
        let mut unknown = Vec::new();
        for (name, value) in entries {
            match name.parse::<OptionCategory>() {
                Ok(category) => {
                    options.add(category, value);
                }
                Err(UnknownOptionCategory(name)) => unknown.push(name),
            }
        }
        (options, unknown)
    }
}
