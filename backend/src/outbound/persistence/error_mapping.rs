//! Shared Diesel error mapping for the admission and account repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.message().to_owned())
}

/// Constructors a repository error type offers to [`map_basic_diesel_error`].
pub struct DieselErrorConstructors<Q, C, D> {
    pub query: Q,
    pub connection: C,
    /// Called with the violated constraint name (or the raw message).
    pub duplicate: D,
}

/// Map Diesel errors onto query, connection and duplicate constructors.
///
/// Unique violations become duplicates; closed connections become connection
/// errors; everything else is a query error.
pub fn map_basic_diesel_error<E, Q, C, D>(
    error: DieselError,
    constructors: DieselErrorConstructors<Q, C, D>,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
    D: FnOnce(String) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => (constructors.query)("record not found"),
        DieselError::QueryBuilderError(_) => (constructors.query)("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let constraint = info
                .constraint_name()
                .map_or_else(|| info.message().to_owned(), str::to_owned);
            (constructors.duplicate)(constraint)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            (constructors.connection)("database connection error")
        }
        DieselError::DeserializationError(_) => {
            (constructors.query)("database row could not be decoded")
        }
        _ => (constructors.query)("database error"),
    }
}
