//! tabload - schema-driven validation and loading of tabular data
//!
//! Delimited source files are read into row sets, checked against declared
//! schema entries, optionally cross-checked against related tables, and
//! committed to a relational store as all-or-nothing batches.

pub mod cli;
pub mod commit;
pub mod config;
pub mod consistency;
pub mod observability;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod store;
pub mod validation;
pub mod value;
