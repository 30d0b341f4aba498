//! Dropdown options and location relationships.
//!
//! Both fall back to seeded defaults while a fiscal year has nothing stored.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{DropdownOptionsRepository, LocationRelationshipRepository};
use crate::domain::{
    DropdownOptions, Error, FiscalYear, LocationRelationship, OptionCategory,
    default_relationships, normalise_relationships,
};

/// Result of adding a single dropdown value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOptionOutcome {
    /// List the value was added to.
    pub category: OptionCategory,
    /// Trimmed value.
    pub value: String,
    /// `false` when the value was already present.
    pub added: bool,
}

impl AddOptionOutcome {
    /// Client-facing description of the outcome.
    pub fn message(&self) -> String {
        if self.added {
            format!("Added '{}' to {}", self.value, self.category)
        } else {
            format!("'{}' already exists in {}", self.value, self.category)
        }
    }
}

/// Dropdown options and location relationships, with defaults.
#[derive(Clone)]
pub struct MasterDataService {
    dropdowns: Arc<dyn DropdownOptionsRepository>,
    relationships: Arc<dyn LocationRelationshipRepository>,
}

impl MasterDataService {
    /// Construct over the two master-data ports.
    pub fn new(
        dropdowns: Arc<dyn DropdownOptionsRepository>,
        relationships: Arc<dyn LocationRelationshipRepository>,
    ) -> Self {
        Self {
            dropdowns,
            relationships,
        }
    }

    /// Stored options, or the defaults when nothing is stored.
    pub async fn options(&self, fiscal_year: &FiscalYear) -> Result<DropdownOptions, Error> {
        Ok(self
            .dropdowns
            .find(fiscal_year)
            .await?
            .unwrap_or_default())
    }

    /// Replace the option set and return what was stored.
    pub async fn replace_options(
        &self,
        fiscal_year: &FiscalYear,
        options: DropdownOptions,
    ) -> Result<DropdownOptions, Error> {
        let options = options.normalised();
        self.dropdowns.replace(fiscal_year, &options).await?;
        info!(%fiscal_year, "dropdown options replaced");
        Ok(options)
    }

    /// Add one value to a category. Nothing is written when it already
    /// exists.
    pub async fn add_option(
        &self,
        fiscal_year: &FiscalYear,
        category: OptionCategory,
        value: &str,
    ) -> Result<AddOptionOutcome, Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::invalid_request("Option type and value are required"));
        }
        let mut options = self.options(fiscal_year).await?;
        let added = options.add(category, value);
        if added {
            self.dropdowns.replace(fiscal_year, &options).await?;
            info!(%fiscal_year, %category, value, "dropdown option added");
        }
        Ok(AddOptionOutcome {
            category,
            value: value.to_owned(),
            added,
        })
    }

    /// Stored relationships, or the defaults when nothing is stored.
    pub async fn relationships(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Vec<LocationRelationship>, Error> {
        Ok(self
            .relationships
            .find(fiscal_year)
            .await?
            .unwrap_or_else(default_relationships))
    }

    /// Validate and replace every relationship for a fiscal year.
    pub async fn replace_relationships(
        &self,
        fiscal_year: &FiscalYear,
        relationships: Vec<LocationRelationship>,
    ) -> Result<Vec<LocationRelationship>, Error> {
        let relationships = normalise_relationships(relationships)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.relationships
            .replace(fiscal_year, &relationships)
            .await?;
        info!(%fiscal_year, count = relationships.len(), "location relationships replaced");
        Ok(relationships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        DropdownOptionsRepositoryError, MockDropdownOptionsRepository,
        MockLocationRelationshipRepository,
    };
    use rstest::rstest;

    fn fy() -> FiscalYear {
        FiscalYear::default()
    }

    fn service(
        dropdowns: MockDropdownOptionsRepository,
        relationships: MockLocationRelationshipRepository,
    ) -> MasterDataService {
        MasterDataService::new(Arc::new(dropdowns), Arc::new(relationships))
    }

    #[tokio::test]
    async fn options_default_when_nothing_is_stored() {
        let mut dropdowns = MockDropdownOptionsRepository::new();
        dropdowns.expect_find().returning(|_| Ok(None));

        let options = service(dropdowns, MockLocationRelationshipRepository::new())
            .options(&fy())
            .await
            .expect("options load");

        assert_eq!(options, DropdownOptions::default());
    }

    #[tokio::test]
    async fn adding_an_existing_option_writes_nothing() {
        let mut dropdowns = MockDropdownOptionsRepository::new();
        dropdowns.expect_find().returning(|_| Ok(None));
        dropdowns.expect_replace().never();

        let outcome = service(dropdowns, MockLocationRelationshipRepository::new())
            .add_option(&fy(), OptionCategory::Groups, "AGEL")
            .await
            .expect("add succeeds");

        assert!(!outcome.added);
        assert_eq!(outcome.message(), "'AGEL' already exists in groups");
    }

    #[tokio::test]
    async fn adding_a_new_option_stores_the_extended_list() {
        let mut dropdowns = MockDropdownOptionsRepository::new();
        dropdowns.expect_find().returning(|_| Ok(None));
        dropdowns
            .expect_replace()
            .withf(|_, options| options.connectivities == ["CTU", "STU"])
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = service(dropdowns, MockLocationRelationshipRepository::new())
            .add_option(&fy(), OptionCategory::Connectivities, " STU ")
            .await
            .expect("add succeeds");

        assert!(outcome.added);
        assert_eq!(outcome.value, "STU");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn blank_option_values_are_rejected(#[case] value: &str) {
        let err = service(
            MockDropdownOptionsRepository::new(),
            MockLocationRelationshipRepository::new(),
        )
        .add_option(&fy(), OptionCategory::Groups, value)
        .await
        .expect_err("blank value");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn replace_failures_surface_as_unavailable() {
        let mut dropdowns = MockDropdownOptionsRepository::new();
        dropdowns
            .expect_replace()
            .returning(|_, _| Err(DropdownOptionsRepositoryError::connection("refused")));

        let err = service(dropdowns, MockLocationRelationshipRepository::new())
            .replace_options(&fy(), DropdownOptions::default())
            .await
            .expect_err("store offline");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn invalid_relationships_are_rejected_before_storage() {
        let mut relationships = MockLocationRelationshipRepository::new();
        relationships.expect_replace().never();

        let err = service(MockDropdownOptionsRepository::new(), relationships)
            .replace_relationships(
                &fy(),
                vec![
                    LocationRelationship::new("Baap", "RJ"),
                    LocationRelationship::new("Essel", " "),
                ],
            )
            .await
            .expect_err("blank code");

        assert_eq!(err.message(), "Invalid relationship at row 2");
    }
}
