//! Validator subsystem
//!
//! Checks a row set against a schema entry and produces a validation report.
//! Only structural failures are errors; everything else is reported for the
//! caller to decide on.

mod report;
mod validator;

pub use report::{DuplicateKeyValue, MissingField, NullViolation, TypeMismatch, ValidationReport};
pub use validator::{validate, SchemaValidator};
