//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{dropdown_options, location_relationships, table_data, users, variables};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = table_data)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TableDataRow {
    pub id: i64,
    pub fiscal_year: String,
    pub data: serde_json::Value,
    pub version: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = table_data)]
pub(crate) struct NewTableDataRow<'a> {
    pub fiscal_year: &'a str,
    pub data: &'a serde_json::Value,
    pub version: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dropdown_options)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DropdownOptionsRow {
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = dropdown_options)]
pub(crate) struct DropdownOptionsUpsert<'a> {
    pub fiscal_year: &'a str,
    pub options: &'a serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = location_relationships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LocationRelationshipRow {
    pub location: String,
    pub location_code: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = location_relationships)]
pub(crate) struct NewLocationRelationshipRow<'a> {
    pub fiscal_year: &'a str,
    pub location: &'a str,
    pub location_code: &'a str,
    pub position: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = variables)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VariableRow {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = variables)]
pub(crate) struct NewVariableRow<'a> {
    pub key: &'a str,
    pub user_id: Option<Uuid>,
    pub value: &'a serde_json::Value,
}
