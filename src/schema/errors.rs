//! Schema error types
//!
//! Error codes:
//! - TABLOAD_UNKNOWN_ENTITY
//! - TABLOAD_DUPLICATE_ENTITY
//! - TABLOAD_INVALID_DEFINITION
//! - TABLOAD_MALFORMED_SCHEMA_FILE
//! - TABLOAD_SCHEMA_VIOLATION

use thiserror::Error;

/// Errors raised by the schema registry and by structural checks against it.
///
/// Data-quality findings are never reported through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Entity name not registered
    #[error("entity '{0}' is not registered")]
    UnknownEntity(String),

    /// Entity name registered twice
    #[error("entity '{0}' is already registered")]
    DuplicateEntity(String),

    /// Schema entry is structurally invalid
    #[error("invalid definition for entity '{entity}': {reason}")]
    InvalidDefinition { entity: String, reason: String },

    /// Schema file could not be read or parsed
    #[error("malformed schema file '{path}': {reason}")]
    MalformedSchemaFile { path: String, reason: String },

    /// Row set shape does not fit the schema entry
    #[error("schema violation for entity '{entity}': {reason}")]
    SchemaViolation { entity: String, reason: String },
}

impl SchemaError {
    pub fn invalid_definition(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_schema_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchemaFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn violation(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// A declared field has no column in the row set
    pub fn missing_column(entity: impl Into<String>, field: &str) -> Self {
        Self::violation(entity, format!("declared column '{}' is absent", field))
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownEntity(_) => "TABLOAD_UNKNOWN_ENTITY",
            SchemaError::DuplicateEntity(_) => "TABLOAD_DUPLICATE_ENTITY",
            SchemaError::InvalidDefinition { .. } => "TABLOAD_INVALID_DEFINITION",
            SchemaError::MalformedSchemaFile { .. } => "TABLOAD_MALFORMED_SCHEMA_FILE",
            SchemaError::SchemaViolation { .. } => "TABLOAD_SCHEMA_VIOLATION",
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaError::UnknownEntity("x".into()).code(), "TABLOAD_UNKNOWN_ENTITY");
        assert_eq!(SchemaError::DuplicateEntity("x".into()).code(), "TABLOAD_DUPLICATE_ENTITY");
        assert_eq!(
            SchemaError::missing_column("goods", "price").code(),
            "TABLOAD_SCHEMA_VIOLATION"
        );
    }

    #[test]
    fn test_missing_column_display() {
        let err = SchemaError::missing_column("goods", "price");
        let display = err.to_string();
        assert!(display.contains("goods"));
        assert!(display.contains("price"));
    }
}
