//! Shared Diesel error mapping for the capacity repositories.
//!
//! Every repository port has `Connection` and `Query` variants; these
//! helpers take the port's constructors so each adapter maps errors the
//! same way. SQL text and driver details stay in `debug` logs.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

/// Map common Diesel error variants into query/connection constructors.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    log_diesel_error(&error);

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            query("stored value could not be converted")
        }
        _ => query("database error"),
    }
}

/// Like [`map_basic_diesel_error`], but unique violations become a
/// conflict carrying the violated constraint name.
pub fn map_diesel_error_with_conflict<E, Q, C, U>(
    error: DieselError,
    query: Q,
    connection: C,
    conflict: U,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
    U: FnOnce(String) -> E,
{
    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        log_diesel_error(&error);
        let constraint = info.constraint_name().unwrap_or("unique constraint");
        return conflict(format!("{constraint} violated"));
    }
    map_basic_diesel_error(error, query, connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{TableDataRepositoryError, UserAccountRepositoryError};
    use rstest::rstest;

    fn table_error(error: DieselError) -> TableDataRepositoryError {
        map_basic_diesel_error(
            error,
            TableDataRepositoryError::query,
            TableDataRepositoryError::connection,
        )
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err = map_basic_pool_error(
            PoolError::checkout("connection refused"),
            TableDataRepositoryError::connection,
        );

        assert!(matches!(err, TableDataRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn closed_connections_become_connection_errors() {
        let err = table_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));

        assert!(matches!(err, TableDataRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn database_details_are_not_exposed() {
        let err = table_error(DieselError::DatabaseError(
            DatabaseErrorKind::Unknown,
            Box::new("syntax error at or near SELECT".to_owned()),
        ));

        assert_eq!(
            err,
            TableDataRepositoryError::query("database error"),
            "SQL detail must stay in logs"
        );
    }

    #[rstest]
    fn unique_violations_become_conflicts() {
        let err = map_diesel_error_with_conflict(
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key".to_owned()),
            ),
            UserAccountRepositoryError::query,
            UserAccountRepositoryError::connection,
            UserAccountRepositoryError::conflict,
        );

        assert!(matches!(err, UserAccountRepositoryError::Conflict { .. }));
    }
}
