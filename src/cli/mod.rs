//! CLI module for tabload
//!
//! Provides the command-line interface:
//! - drivers, init, tables, history: store inspection
//! - schemas, export-schemas: schema registry
//! - describe, validate, check-links: source inspection, no store writes
//! - load, verify: commit a source and compare it with the store
//!
//! Responses are single JSON objects on stdout; logs go to stderr.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, SourceArgs};
pub use commands::{execute, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
