//! SQLite-backed relational store
//!
//! The store is an explicit handle: every component that touches the
//! database receives it as an argument. Foreign keys are enforced on every
//! connection.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, Transaction};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::ddl::{self, CREATE_HISTORY_SQL, HISTORY_TABLE};
use super::errors::{StoreError, StoreResult};
use crate::config::Config;
use crate::schema::{FieldType, Schema, SchemaRegistry};
use crate::value::{Value, STORED_DATE_FORMAT};

/// Drivers this build can open
pub const AVAILABLE_DRIVERS: &[&str] = &["sqlite"];

/// In-memory database location
pub const MEMORY_LOCATION: &str = ":memory:";

pub fn available_drivers() -> &'static [&'static str] {
    AVAILABLE_DRIVERS
}

pub fn driver_available(driver: &str) -> bool {
    AVAILABLE_DRIVERS.contains(&driver)
}

/// A committed record read back from the store, keyed by field name.
pub type Record = BTreeMap<String, Value>;

/// One committed batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub batch_id: Uuid,
    pub entity: String,
    pub rows: usize,
    pub committed_at: DateTime<Utc>,
}

/// Connection handle to the target store.
pub struct Store {
    conn: Connection,
    location: String,
}

impl Store {
    /// Opens the store described by `config`.
    pub fn open(config: &Config) -> StoreResult<Self> {
        if !driver_available(&config.driver) {
            return Err(StoreError::DriverUnavailable {
                driver: config.driver.clone(),
                available: AVAILABLE_DRIVERS.join(", "),
            });
        }

        if config.database == MEMORY_LOCATION {
            Self::open_in_memory()
        } else {
            Self::open_path(Path::new(&config.database))
        }
    }

    /// Opens (creating if needed) a database file.
    pub fn open_path(path: &Path) -> StoreResult<Self> {
        let location = path.display().to_string();
        let conn = Connection::open(path).map_err(|e| StoreError::ConnectionFailed {
            location: location.clone(),
            reason: e.to_string(),
        })?;
        Self::init(conn, location)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::ConnectionFailed {
            location: MEMORY_LOCATION.to_string(),
            reason: e.to_string(),
        })?;
        Self::init(conn, MEMORY_LOCATION.to_string())
    }

    fn init(conn: Connection, location: String) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .and_then(|_| conn.execute_batch(CREATE_HISTORY_SQL))
            .map_err(|e| StoreError::ConnectionFailed {
                location: location.clone(),
                reason: e.to_string(),
            })?;

        info!(location = %location, "store opened");
        Ok(Self { conn, location })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Creates the entity's table if it does not exist.
    pub fn create_table(&self, schema: &Schema) -> StoreResult<()> {
        self.conn.execute_batch(&ddl::create_table_sql(schema))?;
        debug!(entity = %schema.entity, "table ensured");
        Ok(())
    }

    /// Creates every registered entity's table, parents first.
    pub fn create_tables(&self, registry: &SchemaRegistry) -> StoreResult<()> {
        registry.entities().try_for_each(|schema| self.create_table(schema))
    }

    /// User tables, sorted by name.
    pub fn table_names(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name <> ?1 \
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([HISTORY_TABLE], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn table_exists(&self, entity: &str) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [entity],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Number of committed records for an entity; zero if it has no table.
    pub fn count(&self, entity: &str) -> StoreResult<usize> {
        if !self.table_exists(entity)? {
            return Ok(0);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", ddl::quote_ident(entity));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Reads back every record of an entity in insertion order.
    pub fn fetch_records(&self, schema: &Schema) -> StoreResult<Vec<Record>> {
        if !self.table_exists(&schema.entity)? {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&ddl::select_sql(schema))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, field) in schema.fields.iter().enumerate() {
                let value = value_from_sql(row.get_ref(i)?, field.field_type).ok_or_else(|| {
                    StoreError::Database(format!(
                        "column '{}.{}' holds a value that is not {}",
                        schema.entity, field.name, field.field_type
                    ))
                })?;
                record.insert(field.name.clone(), value);
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Committed batches, oldest first, optionally for one entity.
    pub fn history(&self, entity: Option<&str>) -> StoreResult<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT batch_id, entity, rows, committed_at FROM \"_tabload_history\" \
             WHERE ?1 IS NULL OR entity = ?1 ORDER BY committed_at, rowid",
        )?;

        let raw = stmt
            .query_map([entity], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(batch_id, entity, rows, committed_at)| {
                Ok(HistoryEntry {
                    batch_id: Uuid::parse_str(&batch_id)
                        .map_err(|e| StoreError::Database(format!("bad batch id: {}", e)))?,
                    entity,
                    rows: rows as usize,
                    committed_at: DateTime::parse_from_rfc3339(&committed_at)
                        .map_err(|e| StoreError::Database(format!("bad timestamp: {}", e)))?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }

    /// Starts a transaction. Dropping it without committing rolls back.
    pub(crate) fn transaction(&mut self) -> rusqlite::Result<Transaction<'_>> {
        self.conn.transaction()
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Decimal(d) => ToSqlOutput::Owned(SqlValue::Real(*d)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Date(d) => {
                ToSqlOutput::Owned(SqlValue::Text(d.format(STORED_DATE_FORMAT).to_string()))
            }
        })
    }
}

/// Converts a stored cell back to a value of the declared type.
fn value_from_sql(cell: ValueRef<'_>, ty: FieldType) -> Option<Value> {
    match (cell, ty) {
        (ValueRef::Null, _) => Some(Value::Null),
        (ValueRef::Integer(i), FieldType::Integer) => Some(Value::Integer(i)),
        (ValueRef::Integer(i), FieldType::Decimal) => Some(Value::Decimal(i as f64)),
        (ValueRef::Real(d), FieldType::Decimal) => Some(Value::Decimal(d)),
        (ValueRef::Text(bytes), FieldType::Text) => {
            std::str::from_utf8(bytes).ok().map(|s| Value::Text(s.to_string()))
        }
        (ValueRef::Text(bytes), FieldType::Date) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| NaiveDate::parse_from_str(s, STORED_DATE_FORMAT).ok())
            .map(Value::Date),
        _ => None,
    }
}
