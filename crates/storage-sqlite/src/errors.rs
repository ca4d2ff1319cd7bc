//! Storage-specific error types for SQLite operations.
//!
//! Diesel and r2d2 errors are wrapped here and converted to the
//! database-agnostic [`DatabaseError`] defined in `tickerfolio_core`.

use diesel::result::Error as DieselError;
use thiserror::Error;
use tickerfolio_core::errors::{DatabaseError, Error};

/// Storage-specific errors that wrap Diesel and r2d2 types.
///
/// These never leave the crate; they become `Error::Persistence` at the
/// trait boundary.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Writer unavailable: {0}")]
    WriterUnavailable(String),

    #[error("Core error: {0}")]
    CoreError(String),
}

/// Carries a job's own error through the writer transaction.
impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::CoreError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let db_error = match err {
            StorageError::ConnectionFailed(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::PoolError(e) => DatabaseError::PoolCreationFailed(e.to_string()),
            StorageError::QueryFailed(e) => DatabaseError::QueryFailed(e.to_string()),
            StorageError::MigrationFailed(e) => DatabaseError::MigrationFailed(e),
            StorageError::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::WriterUnavailable(e) | StorageError::CoreError(e) => {
                DatabaseError::Internal(e)
            }
        };
        Error::Persistence(db_error)
    }
}

/// Extension trait for converting Diesel and r2d2 results to core results.
pub trait IntoCore<T> {
    fn into_core(self) -> tickerfolio_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> tickerfolio_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> tickerfolio_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
