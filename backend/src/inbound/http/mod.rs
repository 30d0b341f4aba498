//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod backups;
pub mod error;
pub mod health;
pub mod import;
pub mod master_data;
pub mod session;
pub mod session_config;
pub mod state;
pub mod table_data;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod variables;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api` endpoint on `cfg`.
///
/// The caller owns the scope and its session middleware; JSON and query
/// extractor failures are rendered as domain error envelopes.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use capacity_backend::inbound::http::api_services;
///
/// let _app = App::new().service(web::scope("/api").configure(api_services));
/// ```
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .service(table_data::get_table_summary)
        .service(table_data::get_table_data)
        .service(table_data::save_table_data)
        .service(table_data::delete_table_data)
        .service(backups::list_backups)
        .service(backups::restore_backup)
        .service(backups::restore_backup_alias)
        .service(backups::purge_backup)
        .service(master_data::get_dropdown_options)
        .service(master_data::replace_dropdown_options)
        .service(master_data::add_dropdown_option)
        .service(master_data::get_location_relationships)
        .service(master_data::replace_location_relationships)
        .service(accounts::login)
        .service(accounts::register)
        .service(accounts::logout)
        .service(variables::get_variables)
        .service(variables::set_variable)
        .service(variables::delete_variable)
        .service(import::import_data)
        .service(health::api_health);
}
