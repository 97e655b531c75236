//! Cross-table consistency subsystem
//!
//! Checks foreign-key-like links between two loaded row sets before either
//! is committed. Performs no mutation.

mod checker;

pub use checker::{check_consistency, ConsistencyReport, Policy};
