//! Pipeline lifecycle events
//!
//! Events are explicit and typed; their names appear in log output.

use std::fmt;

/// Observable phases of a load run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Schemas registered
    SchemasLoaded,
    /// Source file read into a row set
    SourceLoad,
    /// Row set validated
    Validate,
    /// Cross-table consistency check
    ConsistencyCheck,
    /// Accept/reject decision on a validation report
    Decide,
    /// Batch written to the store
    Commit,
    /// Committed records compared to their source
    Verify,
}

impl Event {
    /// Upper-case name used as the log event prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SourceLoad => "SOURCE_LOAD",
            Event::Validate => "VALIDATE",
            Event::ConsistencyCheck => "CONSISTENCY_CHECK",
            Event::Decide => "DECIDE",
            Event::Commit => "COMMIT",
            Event::Verify => "VERIFY",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::SourceLoad.as_str(), "SOURCE_LOAD");
        assert_eq!(Event::ConsistencyCheck.to_string(), "CONSISTENCY_CHECK");
    }
}
