//! Domain primitives, services and ports.
//!
//! Purpose: Define the capacity-tracking model and its use-cases without any
//! transport or storage concerns. Inbound adapters call the services; the
//! services talk to storage through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - CapacityRecord / TableSnapshot: project rows and their versioned sets.
//! - DropdownOptions / LocationRelationship: per-fiscal-year master data.
//! - CapacityTableService, MasterDataService, AccountService,
//!   VariableService: the use-cases behind the HTTP API.

pub mod account_service;
pub mod auth;
pub mod capacity;
pub mod capacity_table_service;
pub mod dropdown;
pub mod error;
pub mod fiscal_year;
pub mod import;
pub mod location;
pub mod master_data_service;
pub mod ports;
pub mod summary;
pub mod table_data;
pub mod trace_id;
pub mod user;
pub mod variable_service;
pub mod variables;

pub use self::account_service::{AccountService, DEFAULT_HASH_COST};
pub use self::auth::{
    LoginCredentials, LoginValidationError, MAX_EMAIL_LEN, MAX_USERNAME_LEN, MIN_PASSWORD_LEN,
    Registration, RegistrationValidationError,
};
pub use self::capacity::{
    CapacityRecord, GenerationType, RecordValidationError, RowViolation, UnknownGenerationType,
    format_pss, parse_records,
};
pub use self::capacity_table_service::{ActiveTable, CapacityTableService, SAVED_MESSAGE};
pub use self::dropdown::{DropdownOptions, OptionCategory, UnknownOptionCategory};
pub use self::error::{Error, ErrorCode};
pub use self::fiscal_year::{DEFAULT_FISCAL_YEAR, FiscalYear, FiscalYearValidationError};
pub use self::import::{ImportOutcome, convert_fixture_row, convert_fixture_rows};
pub use self::location::{
    LocationRelationship, RelationshipValidationError, code_for, default_relationships,
    normalise_relationships,
};
pub use self::master_data_service::{AddOptionOutcome, MasterDataService};
pub use self::summary::{CapacitySummary, RecordFilter};
pub use self::table_data::{DeleteOutcome, TableSnapshot, next_version};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId, spawn_blocking_scoped};
pub use self::user::{StoredAccount, UserAccount, UserId, UserValidationError};
pub use self::variable_service::VariableService;
pub use self::variables::{SetOutcome, VariableKey, VariableKeyValidationError, VariableScope};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use capacity_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
