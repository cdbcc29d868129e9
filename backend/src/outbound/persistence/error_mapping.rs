//! Mapping of pool and Diesel failures onto [`DocumentStoreError`].

use tracing::debug;

use crate::domain::ports::DocumentStoreError;

use super::pool::PoolError;

/// Map pool errors to connection failures.
pub(crate) fn map_pool_error(error: PoolError) -> DocumentStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    DocumentStoreError::connection(message)
}

/// Map Diesel errors, keeping driver detail out of the message.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> DocumentStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

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
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DocumentStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DocumentStoreError::query("document already exists")
        }
        DieselError::NotFound => DocumentStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => DocumentStoreError::query("database query error"),
        _ => DocumentStoreError::query("database error"),
    }
}
