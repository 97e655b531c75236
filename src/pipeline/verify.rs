//! Read-back verification
//!
//! Compares the records committed for an entity with the rows of its source
//! file, field by field after type coercion.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use super::errors::PipelineResult;
use super::request::EntitySource;
use super::run::prepare;
use crate::commit::map_row;
use crate::observability::{Event, ObservationScope};
use crate::schema::{Schema, SchemaRegistry};
use crate::source::SourceOptions;
use crate::store::{Record, Store};

/// Outcome of comparing a source with the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub entity: String,
    pub source_rows: usize,
    pub stored_rows: usize,
    /// Source rows with no stored counterpart
    pub missing_rows: usize,
    /// Source rows whose stored counterpart differs in some field
    pub mismatched_rows: usize,
    /// Source rows that cannot be coerced to the declared types
    pub unmappable_rows: usize,
    pub matches: bool,
}

/// Compares `source` with what the store holds for its entity.
///
/// Rows are paired by key when the entity has one, otherwise by position.
pub fn verify(
    store: &Store,
    registry: &SchemaRegistry,
    source: &EntitySource,
    options: &SourceOptions,
) -> PipelineResult<VerifyReport> {
    let (schema, rows) = prepare(registry, source, options)?;

    let scope = ObservationScope::new(Event::Verify, &schema.entity);
    let stored = store.fetch_records(schema)?;

    let mut report = VerifyReport {
        entity: schema.entity.clone(),
        source_rows: rows.len(),
        stored_rows: stored.len(),
        missing_rows: 0,
        mismatched_rows: 0,
        unmappable_rows: 0,
        matches: false,
    };

    let by_key: HashMap<Vec<String>, &Record> = if schema.has_key() {
        stored.iter().map(|record| (key_of(schema, record), record)).collect()
    } else {
        HashMap::new()
    };

    for (position, row) in rows.rows().iter().enumerate() {
        let record: Record = match map_row(schema, row) {
            Ok(values) => schema
                .fields
                .iter()
                .map(|field| field.name.clone())
                .zip(values)
                .collect(),
            Err(_) => {
                report.unmappable_rows += 1;
                continue;
            }
        };

        let counterpart = if schema.has_key() {
            by_key.get(&key_of(schema, &record)).copied()
        } else {
            stored.get(position)
        };

        match counterpart {
            None => report.missing_rows += 1,
            Some(found) if *found != record => report.mismatched_rows += 1,
            Some(_) => {}
        }
    }

    report.matches = report.source_rows == report.stored_rows
        && report.missing_rows == 0
        && report.mismatched_rows == 0
        && report.unmappable_rows == 0;

    info!(
        entity = %report.entity,
        source_rows = report.source_rows,
        stored_rows = report.stored_rows,
        matches = report.matches,
        "verification complete"
    );
    scope.complete();
    Ok(report)
}

fn key_of(schema: &Schema, record: &Record) -> Vec<String> {
    schema
        .key_fields()
        .map(|field| record.get(&field.name).map(|v| v.canonical()).unwrap_or_default())
        .collect()
}
