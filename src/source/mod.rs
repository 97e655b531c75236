//! Source loader subsystem
//!
//! Reads an external tabular resource fully into an in-memory row set.
//! Row sets are read-only once loaded; renaming columns yields a new one.

mod errors;
mod loader;
mod row_set;

pub use errors::{SourceError, SourceResult};
pub use loader::{load, load_reader, load_with, SourceOptions};
pub use row_set::{ColumnProfile, Row, RowSet};
