//! Schema registry subsystem
//!
//! Schema entries are data-driven records interpreted by the validator and
//! the committer. They are registered once at process start, either from the
//! built-in catalog or from JSON files, and never mutated afterwards.

pub mod catalog;
mod errors;
mod registry;
mod types;

pub use catalog::Dataset;
pub use errors::{SchemaError, SchemaResult};
pub use registry::SchemaRegistry;
pub use types::{FieldDef, FieldType, ForeignKey, Schema, RESERVED_COLUMN};
