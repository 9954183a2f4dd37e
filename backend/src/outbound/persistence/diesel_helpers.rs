//! Shared error mapping between Diesel/bb8 failures and the domain's
//! repository errors.
//!
//! Every adapter funnels its failures through these functions so the domain
//! sees the same typed variants regardless of which table was involved.

use tracing::debug;

use crate::domain::RepositoryError;

use super::pool::PoolError;

/// Map pool errors to the domain's connection-level repository error.
pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to typed repository errors.
///
/// Unique violations become conflicts, foreign-key violations become
/// not-found (the referenced row does not exist), and closed connections
/// surface as connection failures. Raw driver messages are logged but never
/// propagated to callers.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => RepositoryError::not_found("record not found"),
        DieselError::DatabaseError(kind, _) => match kind {
            DatabaseErrorKind::UniqueViolation => RepositoryError::conflict("duplicate record"),
            DatabaseErrorKind::ForeignKeyViolation => {
                RepositoryError::not_found("referenced record does not exist")
            }
            DatabaseErrorKind::ClosedConnection => {
                RepositoryError::connection("database connection closed")
            }
            _ => RepositoryError::query("database error"),
        },
        _ => RepositoryError::query("database error"),
    }
}

/// Convert a Diesel row count to the port's unsigned count.
pub(crate) fn to_row_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Translate an affected-row count into the port's not-found contract.
pub(crate) fn expect_one_row(affected: usize, entity: &str) -> Result<(), RepositoryError> {
    if affected == 0 {
        return Err(RepositoryError::not_found(format!("{entity} not found")));
    }
    Ok(())
}
