//! Load pipeline
//!
//! Phases, each separately callable:
//! - prepare: look up the entity, read the source, apply the column map
//! - validate: check the row set against its schema entry
//! - decide: accept or reject the report under an `AcceptPolicy`
//! - commit: write the batch atomically
//!
//! `verify` reads committed records back and compares them to the source.

mod errors;
mod request;
mod run;
mod verify;

pub use errors::{PipelineError, PipelineResult};
pub use request::{AcceptPolicy, EntitySource, LinkRequest, LoadRequest};
pub use run::{check_links, decide, open_store, prepare, run, validate_source, RunOutcome};
pub use verify::{verify, VerifyReport};
