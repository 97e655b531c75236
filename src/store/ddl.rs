//! SQL text generated from schema entries

use crate::schema::{Schema, RESERVED_COLUMN};

/// Table holding one row per committed batch
pub const HISTORY_TABLE: &str = "_tabload_history";

pub(crate) const CREATE_HISTORY_SQL: &str = "CREATE TABLE IF NOT EXISTS \"_tabload_history\" (\
     \"batch_id\" TEXT PRIMARY KEY, \
     \"entity\" TEXT NOT NULL, \
     \"rows\" INTEGER NOT NULL, \
     \"committed_at\" TEXT NOT NULL)";

pub(crate) const INSERT_HISTORY_SQL: &str = "INSERT INTO \"_tabload_history\" \
     (\"batch_id\", \"entity\", \"rows\", \"committed_at\") VALUES (?1, ?2, ?3, ?4)";

/// Hidden column holding each record's insertion sequence. Kept apart from
/// the key so an INTEGER key never becomes the rowid.
pub const SEQ_COLUMN: &str = RESERVED_COLUMN;

/// Quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE IF NOT EXISTS` for an entity, with its primary and
/// foreign keys and the sequence column.
pub fn create_table_sql(schema: &Schema) -> String {
    let mut parts: Vec<String> = schema
        .fields
        .iter()
        .map(|field| {
            let mut column = format!("{} {}", quote_ident(&field.name), field.field_type.sql_type());
            if field.is_required() {
                column.push_str(" NOT NULL");
            }
            column
        })
        .collect();
    parts.push(format!("{} INTEGER NOT NULL UNIQUE", quote_ident(SEQ_COLUMN)));

    let keys: Vec<String> = schema.key_fields().map(|f| quote_ident(&f.name)).collect();
    if !keys.is_empty() {
        parts.push(format!("PRIMARY KEY ({})", keys.join(", ")));
    }

    for field in &schema.fields {
        if let Some(fk) = &field.references {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quote_ident(&field.name),
                quote_ident(&fk.entity),
                quote_ident(&fk.field)
            ));
        }
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(&schema.entity),
        parts.join(", ")
    )
}

/// Positional insert in declared field order. The sequence column is
/// filled with the next value for the table.
pub fn insert_sql(schema: &Schema) -> String {
    let table = quote_ident(&schema.entity);
    let seq = quote_ident(SEQ_COLUMN);
    let columns: Vec<String> = schema.fields.iter().map(|f| quote_ident(&f.name)).collect();
    let params: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {table} ({}, {seq}) VALUES ({}, (SELECT COALESCE(MAX({seq}), 0) + 1 FROM {table}))",
        columns.join(", "),
        params.join(", "),
    )
}

/// Read-back in insertion order.
pub fn select_sql(schema: &Schema) -> String {
    let columns: Vec<String> = schema.fields.iter().map(|f| quote_ident(&f.name)).collect();
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        columns.join(", "),
        quote_ident(&schema.entity),
        quote_ident(SEQ_COLUMN)
    )
}
