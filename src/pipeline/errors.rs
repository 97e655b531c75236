//! Pipeline error types
//!
//! Structural and connectivity failures abort a run. Data-quality findings
//! and commit failures are results, not errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::schema::SchemaError;
use crate::source::SourceError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Stable code of the underlying error
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Config(e) => e.code(),
            PipelineError::Schema(e) => e.code(),
            PipelineError::Source(e) => e.code(),
            PipelineError::Store(e) => e.code(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_passes_through() {
        let err: PipelineError = SchemaError::UnknownEntity("bogus".into()).into();
        assert_eq!(err.code(), "TABLOAD_UNKNOWN_ENTITY");
        assert!(err.to_string().contains("bogus"));

        let err: PipelineError = SourceError::unavailable("a.csv", "not found").into();
        assert_eq!(err.code(), "TABLOAD_SOURCE_UNAVAILABLE");
    }
}
