//! Application settings loaded via OrthoConfig and the derived server
//! configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use capacity_backend::domain::ports::StoragePorts;
use capacity_backend::inbound::http::session_config::SessionSettings;
use capacity_backend::inbound::http::state::HttpStateConfig;
use capacity_backend::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FIXTURES_DIR: &str = "fixtures";

/// Raw settings from CLI flags and `CAPACITY_*` environment variables.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAPACITY")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// `memory`, `postgres` or `remote`.
    pub storage_backend: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Pool size for the postgres backend.
    pub database_max_connections: Option<u32>,
    /// Upstream base URL for proxy mode.
    pub remote_base_url: Option<String>,
    /// Upstream request timeout in seconds.
    pub remote_timeout_secs: Option<u64>,
    /// Directory holding `{FY}.json` fixture files.
    pub fixtures_dir: Option<PathBuf>,
    /// Apply embedded migrations at startup (postgres only).
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

/// Errors raised while interpreting [`AppSettings`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The listen address does not parse.
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },
    /// `CAPACITY_STORAGE_BACKEND` names no backend.
    #[error("unknown storage backend {0:?}; expected memory, postgres or remote")]
    UnknownBackend(String),
    /// Postgres selected without a URL.
    #[error("CAPACITY_DATABASE_URL is required for the postgres backend")]
    MissingDatabaseUrl,
    /// Remote selected without a URL.
    #[error("CAPACITY_REMOTE_BASE_URL is required for the remote backend")]
    MissingRemoteBaseUrl,
    /// The upstream URL does not parse.
    #[error("invalid remote base URL {value:?}: {message}")]
    InvalidRemoteBaseUrl { value: String, message: String },
}

/// Storage backend selected at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageSettings {
    /// Process-local maps.
    Memory,
    /// PostgreSQL through Diesel.
    Postgres {
        pool: PoolSettings,
        run_migrations: bool,
    },
    /// Proxy to an upstream service.
    Remote {
        base_url: Url,
        timeout: Duration,
    },
}

/// Pool inputs kept separate so the URL is not echoed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Maximum pool size.
    pub max_connections: u32,
}

impl std::fmt::Debug for PoolSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolSettings")
            .field("database_url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl PoolSettings {
    /// Translate into the adapter's pool config.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.database_url.clone()).with_max_size(self.max_connections)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl AppSettings {
    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_deref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Fixture directory, defaulting to `fixtures`.
    pub fn fixtures_dir(&self) -> PathBuf {
        self.fixtures_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURES_DIR))
    }

    /// Resolve the storage backend and its required inputs.
    pub fn storage(&self) -> Result<StorageSettings, SettingsError> {
        let backend = non_blank(self.storage_backend.as_deref())
            .unwrap_or("memory")
            .to_ascii_lowercase();
        match backend.as_str() {
            "memory" => Ok(StorageSettings::Memory),
            "postgres" | "postgresql" => {
                let database_url = non_blank(self.database_url.as_deref())
                    .ok_or(SettingsError::MissingDatabaseUrl)?;
                Ok(StorageSettings::Postgres {
                    pool: PoolSettings {
                        database_url: database_url.to_owned(),
                        max_connections: self
                            .database_max_connections
                            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
                    },
                    run_migrations: self.run_migrations,
                })
            }
            "remote" | "proxy" => {
                let raw = non_blank(self.remote_base_url.as_deref())
                    .ok_or(SettingsError::MissingRemoteBaseUrl)?;
                let base_url =
                    Url::parse(raw).map_err(|err| SettingsError::InvalidRemoteBaseUrl {
                        value: raw.to_owned(),
                        message: err.to_string(),
                    })?;
                Ok(StorageSettings::Remote {
                    base_url,
                    timeout: Duration::from_secs(
                        self.remote_timeout_secs
                            .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS)
                            .max(1),
                    ),
                })
            }
            other => Err(SettingsError::UnknownBackend(other.to_owned())),
        }
    }
}

/// Everything the HTTP server needs once startup has resolved settings.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ports: StoragePorts,
    pub(crate) http: HttpStateConfig,
}

impl ServerConfig {
    /// Bundle startup inputs with the default HTTP state config.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, ports: StoragePorts) -> Self {
        Self {
            session,
            bind_addr,
            ports,
            http: HttpStateConfig::default(),
        }
    }

    /// Override service construction settings.
    #[must_use]
    pub fn with_http_config(mut self, http: HttpStateConfig) -> Self {
        self.http = http;
        self
    }
}
