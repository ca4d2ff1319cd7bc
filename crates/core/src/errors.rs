//! Core error types for the Tickerfolio engine.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer,
//! and provider failures are folded in from the market data crate.

use serde::Serialize;
use thiserror::Error;
use tickerfolio_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
///
/// Every variant maps to a distinct [`ErrorKind`] so the presentation layer
/// can show a distinct notification per failure.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot hold more than {limit} {entity}")]
    CapacityExceeded { entity: &'static str, limit: usize },

    #[error("Symbol '{0}' is already in this portfolio")]
    DuplicateSymbol(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Quote provider failed: {0}")]
    Provider(String),

    #[error("A refresh of portfolio '{0}' is already in progress")]
    AlreadyInProgress(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("No {from}/{to} exchange rate is available yet")]
    RateUnavailable { from: String, to: String },
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// The snapshot could not be encoded for storage.
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(String),

    /// Internal/unexpected storage error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

/// Stable classification of [`Error`] for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CapacityExceeded,
    DuplicateSymbol,
    SymbolNotFound,
    Provider,
    AlreadyInProgress,
    NotFound,
    Validation,
    Persistence,
    RateUnavailable,
}

impl ErrorKind {
    /// Machine-readable code, unique per kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::CapacityExceeded => "capacity_exceeded",
            Self::DuplicateSymbol => "duplicate_symbol",
            Self::SymbolNotFound => "symbol_not_found",
            Self::Provider => "provider_error",
            Self::AlreadyInProgress => "already_in_progress",
            Self::NotFound => "not_found",
            Self::Validation => "validation_error",
            Self::Persistence => "persistence_error",
            Self::RateUnavailable => "rate_unavailable",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Error::DuplicateSymbol(_) => ErrorKind::DuplicateSymbol,
            Error::SymbolNotFound(_) => ErrorKind::SymbolNotFound,
            Error::Provider(_) => ErrorKind::Provider,
            Error::AlreadyInProgress(_) => ErrorKind::AlreadyInProgress,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Persistence(_) => ErrorKind::Persistence,
            Error::RateUnavailable { .. } => ErrorKind::RateUnavailable,
        }
    }

    /// Shorthand for an [`Error::Validation`] with free-form input text.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::Validation(ValidationError::InvalidInput(message.into()))
    }
}

// === From implementations for common error types ===

impl From<MarketDataError> for Error {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::SymbolNotFound(symbol) => Error::SymbolNotFound(symbol),
            other => Error::Provider(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Persistence(DatabaseError::Serialization(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
