//! Store error types
//!
//! Error codes:
//! - TABLOAD_DRIVER_UNAVAILABLE
//! - TABLOAD_CONNECTION_FAILED
//! - TABLOAD_DUPLICATE_KEY
//! - TABLOAD_TRANSACTION_FAILURE
//! - TABLOAD_STORE_ERROR

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the relational store.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StoreError {
    /// Configured driver is not one of the available drivers
    #[error("driver '{driver}' is not available (available: {available})")]
    DriverUnavailable { driver: String, available: String },

    /// The store could not be opened
    #[error("failed to connect to '{location}': {reason}")]
    ConnectionFailed { location: String, reason: String },

    /// The store rejected a record whose key already exists
    #[error("duplicate key in '{entity}': {detail}")]
    DuplicateKey { entity: String, detail: String },

    /// Any other commit-time fault; the batch was rolled back
    #[error("transaction on '{entity}' failed: {reason}")]
    TransactionFailure { entity: String, reason: String },

    /// Read-side or maintenance query failure
    #[error("store error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn transaction_failure(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TransactionFailure {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DriverUnavailable { .. } => "TABLOAD_DRIVER_UNAVAILABLE",
            StoreError::ConnectionFailed { .. } => "TABLOAD_CONNECTION_FAILED",
            StoreError::DuplicateKey { .. } => "TABLOAD_DUPLICATE_KEY",
            StoreError::TransactionFailure { .. } => "TABLOAD_TRANSACTION_FAILURE",
            StoreError::Database(_) => "TABLOAD_STORE_ERROR",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
