//! Record-set use-cases: fetch, save, delete, summarise, backups and
//! fixture import.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{LocationRelationshipRepository, TableDataRepository};
use crate::domain::{
    CapacityRecord, CapacitySummary, DeleteOutcome, Error, FiscalYear, ImportOutcome,
    LocationRelationship, RecordFilter, TableSnapshot, code_for, convert_fixture_rows,
    default_relationships, parse_records,
};

/// Message returned after a successful save.
pub const SAVED_MESSAGE: &str = "Data saved successfully";

/// The active record set for a fiscal year as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTable {
    /// Fiscal year that was read.
    #[schema(value_type = String, example = "FY_25")]
    pub fiscal_year: FiscalYear,
    /// `None` when nothing is active.
    pub version: Option<i32>,
    /// Active rows; empty when nothing is active.
    pub data: Vec<CapacityRecord>,
}

/// Service behind the table-data, backup and import endpoints.
#[derive(Clone)]
pub struct CapacityTableService {
    tables: Arc<dyn TableDataRepository>,
    relationships: Arc<dyn LocationRelationshipRepository>,
    fixtures_dir: PathBuf,
}

impl CapacityTableService {
    /// Construct the service; fixtures are read from `fixtures_dir`.
    pub fn new(
        tables: Arc<dyn TableDataRepository>,
        relationships: Arc<dyn LocationRelationshipRepository>,
        fixtures_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tables,
            relationships,
            fixtures_dir: fixtures_dir.into(),
        }
    }

    /// Active records for `fiscal_year`; empty when nothing is active.
    pub async fn fetch(&self, fiscal_year: &FiscalYear) -> Result<ActiveTable, Error> {
        let active = self.tables.find_active(fiscal_year).await?;
        Ok(match active {
            Some(snapshot) => ActiveTable {
                fiscal_year: snapshot.fiscal_year,
                version: Some(snapshot.version),
                data: snapshot.data,
            },
            None => ActiveTable {
                fiscal_year: fiscal_year.clone(),
                version: None,
                data: Vec::new(),
            },
        })
    }

    /// Validate, normalise and store `rows` as the next version.
    pub async fn save(
        &self,
        fiscal_year: &FiscalYear,
        rows: &[Value],
    ) -> Result<ActiveTable, Error> {
        let records =
            parse_records(rows).map_err(|err| Error::invalid_request(err.to_string()))?;
        let records = self.prepare(fiscal_year, records).await?;
        let version = self.tables.save(fiscal_year, &records).await?;
        info!(%fiscal_year, version, rows = records.len(), "table data saved");
        Ok(ActiveTable {
            fiscal_year: fiscal_year.clone(),
            version: Some(version),
            data: records,
        })
    }

    /// Soft-delete the active record set and return the client message.
    pub async fn delete(&self, fiscal_year: &FiscalYear) -> Result<&'static str, Error> {
        match self.tables.soft_delete(fiscal_year).await? {
            DeleteOutcome::Deleted => {
                info!(%fiscal_year, "table data archived");
                Ok("Table data marked as deleted successfully")
            }
            DeleteOutcome::AlreadyDeleted => Ok("Table data already marked as deleted"),
            DeleteOutcome::NotFound => Err(Error::not_found(format!(
                "No data found for fiscal year {fiscal_year}"
            ))),
        }
    }

    /// Totals over the active records selected by `filter`.
    pub async fn summary(
        &self,
        fiscal_year: &FiscalYear,
        filter: &RecordFilter,
    ) -> Result<CapacitySummary, Error> {
        let table = self.fetch(fiscal_year).await?;
        Ok(CapacitySummary::compute(&table.data, filter))
    }

    /// Every stored version, newest first.
    pub async fn backups(&self, fiscal_year: &FiscalYear) -> Result<Vec<TableSnapshot>, Error> {
        Ok(self.tables.list_versions(fiscal_year).await?)
    }

    /// Reactivate the data of `version`; returns the resulting active version.
    pub async fn restore(&self, fiscal_year: &FiscalYear, version: i32) -> Result<i32, Error> {
        let restored = self
            .tables
            .restore_version(fiscal_year, version)
            .await?
            .ok_or_else(backup_not_found)?;
        info!(%fiscal_year, from = version, active = restored, "backup restored");
        Ok(restored)
    }

    /// Hard-delete one archived version.
    pub async fn purge_backup(&self, fiscal_year: &FiscalYear, version: i32) -> Result<(), Error> {
        if self.tables.purge_version(fiscal_year, version).await? {
            info!(%fiscal_year, version, "backup purged");
            Ok(())
        } else {
            Err(backup_not_found())
        }
    }

    /// Import every `{FISCAL_YEAR}.json` file in the fixtures directory.
    ///
    /// Files are processed in name order. Each non-empty file becomes a new
    /// version of its fiscal year.
    pub async fn import_fixtures(&self) -> Result<Vec<ImportOutcome>, Error> {
        let files = fixture_files(&self.fixtures_dir).await?;
        let mut outcomes = Vec::with_capacity(files.len());
        for (fiscal_year, path) in files {
            outcomes.push(self.import_file(fiscal_year, &path).await?);
        }
        Ok(outcomes)
    }

    async fn import_file(
        &self,
        fiscal_year: FiscalYear,
        path: &Path,
    ) -> Result<ImportOutcome, Error> {
        let rows = match read_fixture(path).await {
            Ok(rows) => rows,
            Err(message) => {
                warn!(path = %path.display(), %message, "fixture rejected");
                return Ok(ImportOutcome {
                    fiscal_year,
                    message,
                    count: 0,
                    skipped: 0,
                    version: None,
                });
            }
        };
        let (records, skipped) = convert_fixture_rows(&rows);
        if records.is_empty() {
            return Ok(ImportOutcome {
                fiscal_year,
                message: "No valid rows found".to_owned(),
                count: 0,
                skipped,
                version: None,
            });
        }
        let records = self.prepare(&fiscal_year, records).await?;
        let version = self.tables.save(&fiscal_year, &records).await?;
        info!(%fiscal_year, version, count = records.len(), skipped, "fixture imported");
        Ok(ImportOutcome {
            message: format!("Imported {} rows for {fiscal_year}", records.len()),
            fiscal_year,
            count: records.len(),
            skipped,
            version: Some(version),
        })
    }

    async fn prepare(
        &self,
        fiscal_year: &FiscalYear,
        records: Vec<CapacityRecord>,
    ) -> Result<Vec<CapacityRecord>, Error> {
        let relationships = self
            .relationships
            .find(fiscal_year)
            .await?
            .unwrap_or_else(default_relationships);
        Ok(records
            .into_iter()
            .map(|record| fill_location_code(record.normalised(), &relationships))
            .collect())
    }
}

fn backup_not_found() -> Error {
    Error::not_found("Backup not found")
}

fn fill_location_code(
    mut record: CapacityRecord,
    relationships: &[LocationRelationship],
) -> CapacityRecord {
    if record.location_code.is_empty() {
        if let Some(code) = code_for(relationships, &record.location) {
            code.clone_into(&mut record.location_code);
        }
    }
    record
}

async fn fixture_files(dir: &Path) -> Result<Vec<(FiscalYear, PathBuf)>, Error> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::not_found(format!("Fixtures directory {} not found", dir.display()))
        } else {
            Error::internal(format!("failed to read fixtures directory: {err}"))
        }
    })?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| Error::internal(format!("failed to read fixtures directory: {err}")))?
    {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        match FiscalYear::new(stem) {
            Ok(fiscal_year) => files.push((fiscal_year, path)),
            Err(err) => debug!(path = %path.display(), %err, "skipping fixture file"),
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

async fn read_fixture(path: &Path) -> Result<Vec<Value>, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| format!("Failed to read fixture: {err}"))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(_) => Err("Fixture must be a JSON array".to_owned()),
        Err(err) => Err(format!("Invalid fixture JSON: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        MockLocationRelationshipRepository, MockTableDataRepository, TableDataRepositoryError,
    };
    use rstest::rstest;
    use serde_json::json;

    fn fy() -> FiscalYear {
        FiscalYear::new("FY_25").expect("valid fiscal year")
    }

    fn row(id: u64, kind: &str, location: &str) -> Value {
        json!({
            "id": id,
            "sno": id,
            "capacity": 100,
            "group": "AGEL",
            "ppaMerchant": "PPA",
            "type": kind,
            "solar": 60,
            "wind": 40,
            "spv": "agel solar",
            "locationCode": "",
            "location": location,
            "pss": "PSS-4",
            "connectivity": "CTU"
        })
    }

    fn relationships_returning(
        stored: Option<Vec<LocationRelationship>>,
    ) -> MockLocationRelationshipRepository {
        let mut relationships = MockLocationRelationshipRepository::new();
        relationships
            .expect_find()
            .returning(move |_| Ok(stored.clone()));
        relationships
    }

    fn service(
        tables: MockTableDataRepository,
        relationships: MockLocationRelationshipRepository,
    ) -> CapacityTableService {
        CapacityTableService::new(Arc::new(tables), Arc::new(relationships), "fixtures")
    }

    #[tokio::test]
    async fn save_normalises_and_fills_location_codes() {
        let mut tables = MockTableDataRepository::new();
        tables
            .expect_save()
            .withf(|_, records| {
                records.len() == 2
                    && records.iter().all(|record| record.spv == "AGEL SOLAR")
                    && records.iter().all(|record| record.pss == "PSS - 4")
            })
            .times(1)
            .returning(|_, _| Ok(3));

        let table = service(tables, relationships_returning(None))
            .save(&fy(), &[row(1, "Hybrid", "Baap"), row(2, "Solar", "Nowhere")])
            .await
            .expect("save succeeds");

        assert_eq!(table.version, Some(3));
        let [hybrid, solar] = table.data.as_slice() else {
            panic!("expected two records");
        };
        assert_eq!(hybrid.solar, None);
        assert_eq!(hybrid.location_code, "RJ");
        assert_eq!(solar.wind, None);
        assert_eq!(solar.location_code, "");
    }

    #[tokio::test]
    async fn save_uses_stored_relationships() {
        let mut tables = MockTableDataRepository::new();
        tables.expect_save().returning(|_, _| Ok(1));
        let relationships =
            relationships_returning(Some(vec![LocationRelationship::new("Baap", "BP")]));

        let table = service(tables, relationships)
            .save(&fy(), &[row(1, "Wind", "baap")])
            .await
            .expect("save succeeds");

        assert_eq!(table.data[0].location_code, "BP");
    }

    #[tokio::test]
    async fn invalid_rows_are_rejected_before_storage() {
        let mut tables = MockTableDataRepository::new();
        tables.expect_save().never();
        let mut bad = row(1, "Solar", "Baap");
        bad["capacity"] = json!(-1);

        let err = service(tables, MockLocationRelationshipRepository::new())
            .save(&fy(), &[row(1, "Solar", "Baap"), bad])
            .await
            .expect_err("negative capacity");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.message(),
            "Invalid data at row 2: Invalid or missing capacity"
        );
    }

    #[rstest]
    #[case(DeleteOutcome::Deleted, Ok("Table data marked as deleted successfully"))]
    #[case(DeleteOutcome::AlreadyDeleted, Ok("Table data already marked as deleted"))]
    #[case(DeleteOutcome::NotFound, Err(ErrorCode::NotFound))]
    #[tokio::test]
    async fn delete_reports_outcome(
        #[case] outcome: DeleteOutcome,
        #[case] expected: Result<&'static str, ErrorCode>,
    ) {
        let mut tables = MockTableDataRepository::new();
        tables.expect_soft_delete().return_once(move |_| Ok(outcome));

        let result = service(tables, MockLocationRelationshipRepository::new())
            .delete(&fy())
            .await
            .map_err(|err| err.code());

        assert_eq!(result, expected);
    }

    #[rstest]
    #[case(
        TableDataRepositoryError::connection("refused"),
        ErrorCode::ServiceUnavailable
    )]
    #[case(TableDataRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn fetch_maps_repository_errors(
        #[case] failure: TableDataRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut tables = MockTableDataRepository::new();
        tables
            .expect_find_active()
            .return_once(move |_| Err(failure));

        let err = service(tables, MockLocationRelationshipRepository::new())
            .fetch(&fy())
            .await
            .expect_err("repository failure");

        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn restoring_a_missing_version_is_not_found() {
        let mut tables = MockTableDataRepository::new();
        tables.expect_restore_version().returning(|_, _| Ok(None));

        let err = service(tables, MockLocationRelationshipRepository::new())
            .restore(&fy(), 9)
            .await
            .expect_err("missing backup");

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Backup not found");
    }

    #[tokio::test]
    async fn import_reads_fiscal_year_files_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let fixture_row = json!({
            "Sl No": 1,
            "Capacity": "25",
            "Group": "ACL",
            "PPA/Merchant": "PPA",
            "Type": "Solar",
            "Solar": 25,
            "SPV": "acl one",
            "Location": "Khavda",
            "PSS": "2"
        });
        std::fs::write(
            dir.path().join("FY_26.json"),
            json!([fixture_row, { "Type": "Tidal" }]).to_string(),
        )
        .expect("write fixture");
        std::fs::write(dir.path().join("FY_24.json"), "{}").expect("write fixture");
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write note");

        let mut tables = MockTableDataRepository::new();
        tables
            .expect_save()
            .withf(|fy, records| fy.as_str() == "FY_26" && records[0].location_code == "Khavda")
            .times(1)
            .returning(|_, _| Ok(1));
        let service = CapacityTableService::new(
            Arc::new(tables),
            Arc::new(relationships_returning(None)),
            dir.path(),
        );

        let outcomes = service.import_fixtures().await.expect("import succeeds");

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].fiscal_year.as_str(), "FY_24");
        assert_eq!(outcomes[0].message, "Fixture must be a JSON array");
        assert_eq!(outcomes[1].count, 1);
        assert_eq!(outcomes[1].skipped, 1);
        assert_eq!(outcomes[1].version, Some(1));
    }

    #[tokio::test]
    async fn import_without_directory_is_not_found() {
        let service = CapacityTableService::new(
            Arc::new(MockTableDataRepository::new()),
            Arc::new(MockLocationRelationshipRepository::new()),
            "/nonexistent/fixtures",
        );

        let err = service.import_fixtures().await.expect_err("missing dir");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
