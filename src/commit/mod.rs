//! Loader / committer
//!
//! Maps validated rows to typed records and writes them to the store as a
//! single all-or-nothing batch.

mod committer;
mod mapping;

pub use committer::{commit, CommitResult};
pub use mapping::map_row;
