//! Proxy storage backend that forwards to an upstream capacity service.
//!
//! This adapter owns transport details only: request encoding, timeout and
//! HTTP status mapping, and decoding the upstream JSON into domain types.
//! The upstream has no accounts or variables, so those ports report
//! `Unsupported`.

mod dto;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use self::dto::{
    BackupListDto, MessageDto, OptionsRequestDto, RestoreRequestDto, SaveRequestDto,
    SaveResponseDto,
};
use crate::domain::ports::{
    DropdownOptionsRepository, DropdownOptionsRepositoryError, LocationRelationshipRepository,
    LocationRelationshipRepositoryError, StorageHealth, StorageHealthError, StorageHealthProbe,
    StoragePorts, TableDataRepository, TableDataRepositoryError, UserAccountRepository,
    UserAccountRepositoryError, VariableRepository, VariableRepositoryError,
};
use crate::domain::{
    CapacityRecord, DeleteOutcome, DropdownOptions, FiscalYear, LocationRelationship,
    SetOutcome, StoredAccount, TableSnapshot, UserAccount, VariableKey, VariableScope,
};

/// Transport failure before a port-specific error is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RemoteError {
    /// Timeout, DNS, TLS, refused connection, or a 5xx gateway status.
    Unreachable(String),
    /// Any other non-success status.
    Status { status: StatusCode, message: String },
    /// The body did not match the expected shape.
    Decode(String),
}

impl RemoteError {
    fn message(self) -> String {
        match self {
            Self::Unreachable(message) | Self::Status { message, .. } | Self::Decode(message) => {
                message
            }
        }
    }

    fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

macro_rules! impl_remote_error_conversion {
    ($($port_error:ident),+ $(,)?) => {
        $(
            impl From<RemoteError> for $port_error {
                fn from(error: RemoteError) -> Self {
                    match error {
                        RemoteError::Unreachable(message) => Self::connection(message),
                        other => Self::query(other.message()),
                    }
                }
            }
        )+
    };
}

impl_remote_error_conversion!(
    TableDataRepositoryError,
    DropdownOptionsRepositoryError,
    LocationRelationshipRepositoryError,
);

fn map_transport_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Unreachable(format!("upstream timed out: {error}"))
    } else if error.is_decode() {
        RemoteError::Decode(error.to_string())
    } else {
        RemoteError::Unreachable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RemoteError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("upstream status {}", status.as_u16())
    } else {
        format!("upstream status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT
        | StatusCode::REQUEST_TIMEOUT => RemoteError::Unreachable(message),
        _ => RemoteError::Status { status, message },
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteError> {
    serde_json::from_slice(body)
        .map_err(|err| RemoteError::Decode(format!("invalid upstream JSON payload: {err}")))
}

/// Shared reqwest client pointed at one upstream base URL.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use capacity_backend::outbound::remote::RemoteStore;
///
/// let base = "http://upstream.invalid/".parse().expect("url");
/// let store = RemoteStore::new(base, Duration::from_secs(5)).expect("client builds");
/// let ports = store.ports();
/// # let _ = ports;
/// ```
#[derive(Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: Arc<Url>,
}

impl RemoteStore {
    /// Build the adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Arc::new(with_trailing_slash(base_url)),
        })
    }

    /// Bundle this adapter as every driven port.
    pub fn ports(&self) -> StoragePorts {
        StoragePorts {
            tables: Arc::new(self.clone()),
            dropdowns: Arc::new(self.clone()),
            relationships: Arc::new(self.clone()),
            accounts: Arc::new(UnsupportedAccounts),
            variables: Arc::new(UnsupportedVariables),
            health: Arc::new(self.clone()),
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RemoteError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| RemoteError::Decode(format!("invalid upstream path {path}: {err}")))?;
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    /// Send `request` and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, RemoteError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "upstream request rejected");
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    async fn versions(&self, fiscal_year: &FiscalYear) -> Result<Vec<TableSnapshot>, RemoteError> {
        let request = self
            .request(Method::GET, "backup-data")?
            .query(&[("fiscalYear", fiscal_year.as_str())]);
        let list: BackupListDto = decode(&self.send(request).await?)?;
        let mut snapshots = list
            .backups
            .into_iter()
            .map(|dto| dto.into_domain().map_err(RemoteError::Decode))
            .collect::<Result<Vec<_>, _>>()?;
        snapshots.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(snapshots)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl TableDataRepository for RemoteStore {
    async fn find_active(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<TableSnapshot>, TableDataRepositoryError> {
        let versions = self.versions(fiscal_year).await?;
        Ok(versions.into_iter().find(|snapshot| !snapshot.is_deleted))
    }

    async fn save(
        &self,
        fiscal_year: &FiscalYear,
        records: &[CapacityRecord],
    ) -> Result<i32, TableDataRepositoryError> {
        let request = self.request(Method::POST, "table-data")?.json(&SaveRequestDto {
            fiscal_year: fiscal_year.as_str(),
            data: records,
        });
        let saved: SaveResponseDto = decode(&self.send(request).await?)?;
        saved.version.ok_or_else(|| {
            TableDataRepositoryError::query("upstream save response carried no version")
        })
    }

    async fn soft_delete(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<DeleteOutcome, TableDataRepositoryError> {
        let request = self
            .request(Method::DELETE, "table-data")?
            .query(&[("fiscalYear", fiscal_year.as_str())]);
        match self.send(request).await {
            Ok(body) => {
                let reply: MessageDto = decode(&body)?;
                Ok(if reply.message.contains("already") {
                    DeleteOutcome::AlreadyDeleted
                } else {
                    DeleteOutcome::Deleted
                })
            }
            Err(err) if err.is_not_found() => Ok(DeleteOutcome::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_versions(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Vec<TableSnapshot>, TableDataRepositoryError> {
        Ok(self.versions(fiscal_year).await?)
    }

    async fn restore_version(
        &self,
        fiscal_year: &FiscalYear,
        version: i32,
    ) -> Result<Option<i32>, TableDataRepositoryError> {
        let request = self
            .request(Method::POST, "backup-data/restore")?
            .json(&RestoreRequestDto {
                fiscal_year: fiscal_year.as_str(),
                version,
            });
        match self.send(request).await {
            Ok(_) => {}
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err.into()),
        }
        let active = self.find_active(fiscal_year).await?;
        Ok(Some(active.map_or(version, |snapshot| snapshot.version)))
    }

    async fn purge_version(
        &self,
        fiscal_year: &FiscalYear,
        version: i32,
    ) -> Result<bool, TableDataRepositoryError> {
        let version = version.to_string();
        let request = self.request(Method::DELETE, "backup-data")?.query(&[
            ("fiscalYear", fiscal_year.as_str()),
            ("version", version.as_str()),
        ]);
        match self.send(request).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl DropdownOptionsRepository for RemoteStore {
    async fn find(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<DropdownOptions>, DropdownOptionsRepositoryError> {
        let request = self
            .request(Method::GET, "dropdown-options")?
            .query(&[("fiscalYear", fiscal_year.as_str())]);
        let options: DropdownOptions = decode(&self.send(request).await?)?;
        Ok(Some(options))
    }

    async fn replace(
        &self,
        fiscal_year: &FiscalYear,
        options: &DropdownOptions,
    ) -> Result<(), DropdownOptionsRepositoryError> {
        let request = self
            .request(Method::POST, "dropdown-options")?
            .json(&OptionsRequestDto {
                fiscal_year: fiscal_year.as_str(),
                options,
            });
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl LocationRelationshipRepository for RemoteStore {
    async fn find(
        &self,
        fiscal_year: &FiscalYear,
    ) -> Result<Option<Vec<LocationRelationship>>, LocationRelationshipRepositoryError> {
        let request = self
            .request(Method::GET, "location-relationships")?
            .query(&[("fiscalYear", fiscal_year.as_str())]);
        let relationships: Vec<LocationRelationship> = decode(&self.send(request).await?)?;
        Ok(Some(relationships))
    }

    async fn replace(
        &self,
        fiscal_year: &FiscalYear,
        relationships: &[LocationRelationship],
    ) -> Result<(), LocationRelationshipRepositoryError> {
        let request = self
            .request(Method::POST, "location-relationships")?
            .query(&[("fiscalYear", fiscal_year.as_str())])
            .json(relationships);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageHealthProbe for RemoteStore {
    async fn probe(&self) -> Result<StorageHealth, StorageHealthError> {
        let request = self
            .request(Method::GET, "health")
            .map_err(|err| StorageHealthError::unavailable(err.message()))?;
        let body = self
            .send(request)
            .await
            .map_err(|err| StorageHealthError::unavailable(err.message()))?;
        let detail = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|reply| {
                reply
                    .get("database")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| "connected".to_owned());
        Ok(StorageHealth::new("remote", detail))
    }
}

/// Account port for proxy mode; the upstream has no accounts.
#[derive(Debug, Clone, Copy)]
struct UnsupportedAccounts;

#[async_trait]
impl UserAccountRepository for UnsupportedAccounts {
    async fn find_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<StoredAccount>, UserAccountRepositoryError> {
        Err(UserAccountRepositoryError::unsupported("login"))
    }

    async fn exists(
        &self,
        _email: &str,
        _username: &str,
    ) -> Result<bool, UserAccountRepositoryError> {
        Err(UserAccountRepositoryError::unsupported("registration"))
    }

    async fn insert(
        &self,
        _account: &UserAccount,
        _password_hash: &str,
    ) -> Result<(), UserAccountRepositoryError> {
        Err(UserAccountRepositoryError::unsupported("registration"))
    }
}

/// Variable port for proxy mode.
#[derive(Debug, Clone, Copy)]
struct UnsupportedVariables;

#[async_trait]
impl VariableRepository for UnsupportedVariables {
    async fn get(
        &self,
        _key: &VariableKey,
        _scope: VariableScope,
    ) -> Result<Option<Value>, VariableRepositoryError> {
        Err(VariableRepositoryError::unsupported("variables"))
    }

    async fn list(
        &self,
        _scope: VariableScope,
    ) -> Result<BTreeMap<String, Value>, VariableRepositoryError> {
        Err(VariableRepositoryError::unsupported("variables"))
    }

    async fn set(
        &self,
        _key: &VariableKey,
        _scope: VariableScope,
        _value: &Value,
    ) -> Result<SetOutcome, VariableRepositoryError> {
        Err(VariableRepositoryError::unsupported("variables"))
    }

    async fn delete(
        &self,
        _key: &VariableKey,
        _scope: VariableScope,
    ) -> Result<bool, VariableRepositoryError> {
        Err(VariableRepositoryError::unsupported("variables"))
    }
}
