//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint under `/api`, the orchestration
//! probes, the shared schemas, and the session cookie security scheme. The
//! generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    CapacityRecord, CapacitySummary, DropdownOptions, Error, ErrorCode, ImportOutcome,
    LocationRelationship, OptionCategory, TableSnapshot, UserAccount,
};
use crate::inbound::http::{
    accounts, backups, health, import, master_data, table_data, variables,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Capacity tracker API",
        description = "Per-fiscal-year project capacity tables, master data and accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        table_data::get_table_data,
        table_data::save_table_data,
        table_data::delete_table_data,
        table_data::get_table_summary,
        backups::list_backups,
        backups::restore_backup,
        backups::purge_backup,
        master_data::get_dropdown_options,
        master_data::replace_dropdown_options,
        master_data::add_dropdown_option,
        master_data::get_location_relationships,
        master_data::replace_location_relationships,
        accounts::login,
        accounts::register,
        accounts::logout,
        variables::get_variables,
        variables::set_variable,
        variables::delete_variable,
        import::import_data,
        health::api_health,
        health::ready,
        health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CapacityRecord,
        CapacitySummary,
        TableSnapshot,
        DropdownOptions,
        OptionCategory,
        LocationRelationship,
        UserAccount,
        ImportOutcome,
    )),
    tags(
        (name = "table-data", description = "Capacity tables and their summaries"),
        (name = "backups", description = "Archived table versions"),
        (name = "master-data", description = "Dropdown options and location codes"),
        (name = "accounts", description = "Registration and session login"),
        (name = "variables", description = "Named JSON values"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
