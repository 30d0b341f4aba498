//! In-process storage backend.
//!
//! Every port is served from `RwLock`-guarded maps behind one shared
//! [`MemoryStore`]. Data lives as long as the process. Guards are released
//! before returning, so no lock is held across an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::domain::ports::{
    DropdownOptionsRepository, DropdownOptionsRepositoryError, LocationRelationshipRepository,
    LocationRelationshipRepositoryError, StorageHealth, StorageHealthError, StorageHealthProbe,
    StoragePorts, TableDataRepository, TableDataRepositoryError, UserAccountRepository,
    UserAccountRepositoryError, VariableRepository, VariableRepositoryError,
};
use crate::domain::{
    CapacityRecord, DeleteOutcome, DropdownOptions, FiscalYear, LocationRelationship,
    SetOutcome, StoredAccount, TableSnapshot, UserAccount, VariableKey, VariableScope,
    next_version,
};

const POISONED: &str = "memory store lock poisoned";

#[derive(Default)]
struct MemoryState {
    tables: RwLock<HashMap<FiscalYear, Vec<TableSnapshot>>>,
    dropdowns: RwLock<HashMap<FiscalYear, DropdownOptions>>,
    relationships: RwLock<HashMap<FiscalYear, Vec<LocationRelationship>>>,
    accounts: RwLock<Vec<StoredAccount>>,
    variables: RwLock<HashMap<(VariableScope, VariableKey), Value>>,
    next_id: AtomicI64,
}

impl MemoryState {
    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, &'static str> {
    lock.read().map_err(|_| POISONED)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, &'static str> {
    lock.write().map_err(|_| POISONED)
}

/// Shared in-memory store implementing every storage port.
///
/// # Examples
/// ```
/// use capacity_backend::outbound::memory::MemoryStore;
///
/// let ports = MemoryStore::new().ports();
/// # let _ = ports;
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this store as every driven port.
    pub fn ports(&self) -> StoragePorts {
        StoragePorts {
            tables: Arc::new(self.clone()),
            dropdowns: Arc::new(self.clone()),
            relationships: Arc::new(self.clone()),
            accounts: Arc::new(self.clone()),
            variables: Arc::new(self.clone()),
            health: Arc::new(self.clone()),
        }
    }
}

fn archive_active(snapshots: &mut [TableSnapshot]) -> bool {
    let now = Utc::now();
    let mut archived = false;
    for snapshot in snapshots.iter_mut().filter(|snapshot| !snapshot.is_deleted) {
        snapshot.is_deleted = true;
        snapshot.updated_at = now;
        archived = true;
    }
    archived
}

fn push_version(
    state: &MemoryState,
    snapshots: &mut Vec<TableSnapshot>,
    fiscal_year: &FiscalYear,
    data: Vec<CapacityRecord>,
) -> i32 {
    archive_active(snapshots);
    let version = next_version(snapshots.iter().map(|snapshot| snapshot.version).max());
    let now = Utc::now();
    snapshots.push(TableSnapshot {
        id: state.allocate_id(),
        fiscal_year: fiscal_year.clone(),
        data,
        version,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    });
    version
}

#[async_trait]
impl TableDataRepository for MemoryStore {
    async fn find_active(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<TableSnapshot>, TableDataRepositoryError> {
        let tables = read(&self.state.tables).map_err(TableDataRepositoryError::query)?;
        Ok(tables
            .get(fiscal_year)
            .and_then(|snapshots| snapshots.iter().find(|snapshot| !snapshot.is_deleted))
            .cloned())
    }

    async fn save(
        &self,
        fiscal_year: &FiscalYear,
        records: &[CapacityRecord],
    ) -> Result<i32, TableDataRepositoryError> {
        let mut tables = write(&self.state.tables).map_err(TableDataRepositoryError::query)?;
        let snapshots = tables.entry(fiscal_year.clone()).or_default();
        Ok(push_version(
            &self.state,
            snapshots,
            fiscal_year,
            records.to_vec(),
        ))
    }

    async fn soft_delete(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<DeleteOutcome, TableDataRepositoryError> {
        let mut tables = write(&self.state.tables).map_err(TableDataRepositoryError::query)?;
        Ok(match tables.get_mut(fiscal_year) {
            None => DeleteOutcome::NotFound,
            Some(snapshots) if snapshots.is_empty() => DeleteOutcome::NotFound,
            Some(snapshots) => {
                if archive_active(snapshots) {
                    DeleteOutcome::Deleted
                } else {
                    DeleteOutcome::AlreadyDeleted
                }
            }
        })
    }

    async fn list_versions(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Vec<TableSnapshot>, TableDataRepositoryError> {
        let tables = read(&self.state.tables).map_err(TableDataRepositoryError::query)?;
        let mut snapshots = tables.get(fiscal_year).cloned().unwrap_or_default();
        snapshots.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(snapshots)
    }

    async fn restore_version(
        &self,
        fiscal_year: &FiscalYear,
        version: i32,
    ) -> Result<Option<i32>, TableDataRepositoryError> {
        let mut tables = write(&self.state.tables).map_err(TableDataRepositoryError::query)?;
        let Some(snapshots) = tables.get_mut(fiscal_year) else {
            return Ok(None);
        };
        let Some(source) = snapshots
            .iter()
            .find(|snapshot| snapshot.version == version)
        else {
            return Ok(None);
        };
        let data = source.data.clone();
        Ok(Some(push_version(&self.state, snapshots, fiscal_year, data)))
    }

    async fn purge_version(
        &self,
        fiscal_year: &FiscalYear,
        version: i32,
    ) -> Result<bool, TableDataRepositoryError> {
        let mut tables = write(&self.state.tables).map_err(TableDataRepositoryError::query)?;
        let Some(snapshots) = tables.get_mut(fiscal_year) else {
            return Ok(false);
        };
        let before = snapshots.len();
        snapshots.retain(|snapshot| !(snapshot.version == version && snapshot.is_deleted));
        Ok(snapshots.len() < before)
    }
}

#[async_trait]
impl DropdownOptionsRepository for MemoryStore {
    async fn find(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<DropdownOptions>, DropdownOptionsRepositoryError> {
        let dropdowns =
            read(&self.state.dropdowns).map_err(DropdownOptionsRepositoryError::query)?;
        Ok(dropdowns.get(fiscal_year).cloned())
    }

    async fn replace(
        &self,
        fiscal_year: &FiscalYear,
        options: &DropdownOptions,
    ) -> Result<(), DropdownOptionsRepositoryError> {
        let mut dropdowns =
            write(&self.state.dropdowns).map_err(DropdownOptionsRepositoryError::query)?;
        dropdowns.insert(fiscal_year.clone(), options.clone());
        Ok(())
    }
}

#[async_trait]
impl LocationRelationshipRepository for MemoryStore {
    async fn find(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<Vec<LocationRelationship>>, LocationRelationshipRepositoryError> {
        let relationships = read(&self.state.relationships)
            .map_err(LocationRelationshipRepositoryError::query)?;
        Ok(relationships.get(fiscal_year).cloned())
    }

    async fn replace(
        &self,
        fiscal_year: &FiscalYear,
        relationships: &[LocationRelationship],
    ) -> Result<(), LocationRelationshipRepositoryError> {
        let mut stored = write(&self.state.relationships)
            .map_err(LocationRelationshipRepositoryError::query)?;
        stored.insert(fiscal_year.clone(), relationships.to_vec());
        Ok(())
    }
}

/// Emails and usernames are unique regardless of case.
fn claims(account: &UserAccount, email: &str, username: &str) -> bool {
    account.email.to_lowercase() == email.to_lowercase()
        || account.username.to_lowercase() == username.to_lowercase()
}

#[async_trait]
impl UserAccountRepository for MemoryStore {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredAccount>, UserAccountRepositoryError> {
        let accounts = read(&self.state.accounts).map_err(UserAccountRepositoryError::query)?;
        Ok(accounts
            .iter()
            .find(|stored| stored.account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn exists(&self, email: &str, username: &str) -> Result<bool, UserAccountRepositoryError> {
        let accounts = read(&self.state.accounts).map_err(UserAccountRepositoryError::query)?;
        Ok(accounts
            .iter()
            .any(|stored| claims(&stored.account, email, username)))
    }

    async fn insert(
        &self,
        account: &UserAccount,
        password_hash: &str,
    ) -> Result<(), UserAccountRepositoryError> {
        let mut accounts = write(&self.state.accounts).map_err(UserAccountRepositoryError::query)?;
        if accounts
            .iter()
            .any(|stored| claims(&stored.account, &account.email, &account.username))
        {
            return Err(UserAccountRepositoryError::conflict(
                "email or username already registered",
            ));
        }
        accounts.push(StoredAccount {
            account: account.clone(),
            password_hash: password_hash.to_owned(),
        });
        Ok(())
    }
}

#[async_trait]
impl VariableRepository for MemoryStore {
    async fn get(
        &self,
        key: &VariableKey,
        scope: VariableScope,
    ) -> Result<Option<Value>, VariableRepositoryError> {
        let variables = read(&self.state.variables).map_err(VariableRepositoryError::query)?;
        Ok(variables.get(&(scope, key.clone())).cloned())
    }

    async fn list(
        &self,
        scope: VariableScope,
    ) -> Result<BTreeMap<String, Value>, VariableRepositoryError> {
        let variables = read(&self.state.variables).map_err(VariableRepositoryError::query)?;
        Ok(variables
            .iter()
            .filter(|((owner, _), _)| *owner == scope)
            .map(|((_, key), value)| (key.as_str().to_owned(), value.clone()))
            .collect())
    }

    async fn set(
        &self,
        key: &VariableKey,
        scope: VariableScope,
        value: &Value,
    ) -> Result<SetOutcome, VariableRepositoryError> {
        let mut variables = write(&self.state.variables).map_err(VariableRepositoryError::query)?;
        Ok(match variables.insert((scope, key.clone()), value.clone()) {
            Some(_) => SetOutcome::Updated,
            None => SetOutcome::Created,
        })
    }

    async fn delete(
        &self,
        key: &VariableKey,
        scope: VariableScope,
    ) -> Result<bool, VariableRepositoryError> {
        let mut variables = write(&self.state.variables).map_err(VariableRepositoryError::query)?;
        Ok(variables.remove(&(scope, key.clone())).is_some())
    }
}

#[async_trait]
impl StorageHealthProbe for MemoryStore {
    async fn probe(&self) -> Result<StorageHealth, StorageHealthError> {
        read(&self.state.tables).map_err(StorageHealthError::unavailable)?;
        Ok(StorageHealth::new("memory", "connected"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GenerationType, UserId};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::new()
    }

    fn fy() -> FiscalYear {
        FiscalYear::default()
    }

    fn record(id: u64, capacity: f64) -> CapacityRecord {
        CapacityRecord {
            id,
            sno: id,
            capacity,
            group: "AGEL".to_owned(),
            ppa_merchant: "PPA".to_owned(),
            generation_type: GenerationType::Solar,
            solar: Some(capacity),
            wind: None,
            spv: "SPV-1".to_owned(),
            location_code: "RJ".to_owned(),
            location: "Baap".to_owned(),
            pss: "PSS - 1".to_owned(),
            connectivity: "CTU".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn saves_archive_the_previous_version(store: MemoryStore) {
        for capacity in [10.0, 20.0, 30.0] {
            store.save(&fy(), &[record(1, capacity)]).await.expect("save");
        }

        let versions = store.list_versions(&fy()).await.expect("versions");
        let active = store.find_active(&fy()).await.expect("find").expect("active");

        assert_eq!(
            versions.iter().map(|s| s.version).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );
        assert_eq!(versions.iter().filter(|s| s.is_deleted).count(), 2);
        assert_eq!(active.version, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn soft_delete_reports_each_state(store: MemoryStore) {
        assert_eq!(
            store.soft_delete(&fy()).await.expect("delete"),
            DeleteOutcome::NotFound
        );
        store.save(&fy(), &[record(1, 5.0)]).await.expect("save");
        assert_eq!(
            store.soft_delete(&fy()).await.expect("delete"),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            store.soft_delete(&fy()).await.expect("delete"),
            DeleteOutcome::AlreadyDeleted
        );
        assert!(store.find_active(&fy()).await.expect("find").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn restore_copies_an_archived_version_forward(store: MemoryStore) {
        store.save(&fy(), &[record(1, 10.0)]).await.expect("save");
        store.save(&fy(), &[record(1, 20.0)]).await.expect("save");

        let restored = store.restore_version(&fy(), 1).await.expect("restore");
        let active = store.find_active(&fy()).await.expect("find").expect("active");

        assert_eq!(restored, Some(3));
        assert_eq!(active.data, vec![record(1, 10.0)]);
    }

    #[rstest]
    #[tokio::test]
    async fn restoring_the_active_version_bumps_it(store: MemoryStore) {
        store.save(&fy(), &[record(1, 10.0)]).await.expect("save");
        store.save(&fy(), &[record(1, 20.0)]).await.expect("save");

        let restored = store.restore_version(&fy(), 2).await.expect("restore");
        let versions = store.list_versions(&fy()).await.expect("versions");

        assert_eq!(restored, Some(3));
        assert_eq!(versions.iter().filter(|s| !s.is_deleted).count(), 1);
        assert_eq!(versions.first().map(|s| s.data.clone()), Some(vec![record(1, 20.0)]));
    }

    #[rstest]
    #[tokio::test]
    async fn restore_of_unknown_version_is_none(store: MemoryStore) {
        store.save(&fy(), &[record(1, 10.0)]).await.expect("save");
        assert_eq!(store.restore_version(&fy(), 9).await.expect("restore"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn purge_only_removes_archived_versions(store: MemoryStore) {
        store.save(&fy(), &[record(1, 10.0)]).await.expect("save");
        store.save(&fy(), &[record(1, 20.0)]).await.expect("save");

        assert!(!store.purge_version(&fy(), 2).await.expect("purge active"));
        assert!(store.purge_version(&fy(), 1).await.expect("purge archived"));
        assert!(!store.purge_version(&fy(), 1).await.expect("purge again"));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_accounts_conflict(store: MemoryStore) {
        let account = UserAccount {
            id: UserId::random(),
            username: "asha".to_owned(),
            email: "asha@example.com".to_owned(),
            created_at: Utc::now(),
        };
        store.insert(&account, "hash").await.expect("first insert");

        let again = UserAccount {
            id: UserId::random(),
            ..account.clone()
        };
        let err = store.insert(&again, "hash").await.expect_err("duplicate");

        assert!(matches!(err, UserAccountRepositoryError::Conflict { .. }));
        assert!(store.exists("ASHA@example.com", "other").await.expect("exists"));
    }

    #[rstest]
    #[tokio::test]
    async fn usernames_are_unique_regardless_of_case(store: MemoryStore) {
        let account = UserAccount {
            id: UserId::random(),
            username: "ops".to_owned(),
            email: "ops@example.com".to_owned(),
            created_at: Utc::now(),
        };
        store.insert(&account, "hash").await.expect("first insert");

        let shouting = UserAccount {
            id: UserId::random(),
            username: "OPS".to_owned(),
            email: "second@example.com".to_owned(),
            created_at: Utc::now(),
        };
        let err = store
            .insert(&shouting, "hash")
            .await
            .expect_err("case-folded duplicate");

        assert!(matches!(err, UserAccountRepositoryError::Conflict { .. }));
        assert!(store.exists("new@example.com", "Ops").await.expect("exists"));
    }

    #[rstest]
    #[tokio::test]
    async fn variables_are_partitioned_by_scope(store: MemoryStore) {
        let key = VariableKey::new("theme").expect("key");
        let user = Some(UserId::random());

        let first = store.set(&key, None, &json!("dark")).await.expect("set");
        let second = store.set(&key, None, &json!("light")).await.expect("set");
        store.set(&key, user, &json!("blue")).await.expect("set");

        assert_eq!(first, SetOutcome::Created);
        assert_eq!(second, SetOutcome::Updated);
        assert_eq!(
            store.get(&key, None).await.expect("get"),
            Some(json!("light"))
        );
        assert_eq!(store.list(user).await.expect("list").len(), 1);
        assert!(store.delete(&key, user).await.expect("delete"));
        assert!(!store.delete(&key, user).await.expect("delete again"));
    }
}
