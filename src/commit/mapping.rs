//! Row to typed-record mapping

use crate::schema::Schema;
use crate::source::Row;
use crate::value::Value;

/// Maps a row to typed values in declared field order.
///
/// Fails on a cell that does not parse as its declared type, or on a null
/// in a required field.
pub fn map_row(schema: &Schema, row: &Row) -> Result<Vec<Value>, String> {
    schema
        .fields
        .iter()
        .map(|field| {
            let cell = row.get(&field.name).and_then(|cell| cell.as_deref());
            let value = Value::parse(cell, field.field_type).ok_or_else(|| {
                format!(
                    "field '{}': '{}' is not a valid {}",
                    field.name,
                    cell.unwrap_or_default(),
                    field.field_type
                )
            })?;

            if value.is_null() && field.is_required() {
                return Err(format!("field '{}' is required but null", field.name));
            }
            Ok(value)
        })
        .collect()
}
