//! Source loader error types
//!
//! Error codes:
//! - TABLOAD_SOURCE_UNAVAILABLE
//! - TABLOAD_MALFORMED_SOURCE
//! - TABLOAD_UNKNOWN_COLUMN

use thiserror::Error;

/// Errors raised while reading or reshaping a tabular source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The resource could not be opened
    #[error("source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    /// Rows could not be parsed into a uniform column structure
    #[error("source '{source_id}' is malformed: {reason}")]
    MalformedSource { source_id: String, reason: String },

    /// A column mapping names a column the source does not have
    #[error("source '{source_id}' has no column '{column}'")]
    UnknownColumn { source_id: String, column: String },
}

impl SourceError {
    pub fn unavailable(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_id: source_id.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSource {
            source_id: source_id.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SourceError::SourceUnavailable { .. } => "TABLOAD_SOURCE_UNAVAILABLE",
            SourceError::MalformedSource { .. } => "TABLOAD_MALFORMED_SOURCE",
            SourceError::UnknownColumn { .. } => "TABLOAD_UNKNOWN_COLUMN",
        }
    }
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;
