//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Versioned record sets. At most one row per fiscal year has
    /// `is_deleted = false`.
    table_data (id) {
        id -> Int8,
        fiscal_year -> Varchar,
        /// JSON array of capacity records.
        data -> Jsonb,
        version -> Int4,
        is_deleted -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    dropdown_options (fiscal_year) {
        fiscal_year -> Varchar,
        /// Object of category name to value list.
        options -> Jsonb,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    location_relationships (id) {
        id -> Int8,
        fiscal_year -> Varchar,
        location -> Varchar,
        location_code -> Varchar,
        /// Order within the fiscal year's list.
        position -> Int4,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    variables (id) {
        id -> Int8,
        key -> Varchar,
        /// `NULL` for global variables.
        user_id -> Nullable<Uuid>,
        value -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    table_data,
    dropdown_options,
    location_relationships,
    users,
    variables,
);
