//! Relational store subsystem
//!
//! One table per entity, created from its schema entry, plus a history table
//! with one row per committed batch. Values are stored as:
//! - integer: INTEGER
//! - decimal: REAL
//! - text: TEXT
//! - date: TEXT, `%Y-%m-%d`
//!
//! Records are read back in insertion order via a hidden sequence column.

mod ddl;
mod errors;
mod sqlite;

pub use ddl::{create_table_sql, insert_sql, quote_ident, HISTORY_TABLE, SEQ_COLUMN};
pub use errors::{StoreError, StoreResult};
pub use sqlite::{
    available_drivers, driver_available, HistoryEntry, Record, Store, AVAILABLE_DRIVERS,
    MEMORY_LOCATION,
};

pub(crate) use ddl::INSERT_HISTORY_SQL;
