//! In-memory row sets

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::errors::{SourceError, SourceResult};
use crate::schema::FieldType;
use crate::value::{is_null_token, observed_type};

/// One row: field name to raw cell, `None` for null.
pub type Row = BTreeMap<String, Option<String>>;

/// An ordered, read-only table of rows loaded from one source.
///
/// Rows loaded from a delimited file always carry every column. Rows built
/// programmatically may lack some columns entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// Per-column summary of a row set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    /// Narrowest type every non-null cell fits, `None` if all null
    #[serde(rename = "type")]
    pub inferred_type: Option<FieldType>,
    pub nulls: usize,
    pub distinct: usize,
}

impl RowSet {
    /// Builds a row set from prepared rows.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Builds a row set from positional records. Cells are trimmed and null
    /// tokens become `None`; every record must have one cell per column.
    pub fn from_records<S, R, C>(name: impl Into<String>, columns: &[S], records: R) -> SourceResult<Self>
    where
        S: AsRef<str>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let name = name.into();
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().trim().to_string()).collect();

        let mut seen = HashSet::new();
        for column in &columns {
            if column.is_empty() {
                return Err(SourceError::malformed(&name, "header contains an empty column name"));
            }
            if !seen.insert(column.as_str()) {
                return Err(SourceError::malformed(
                    &name,
                    format!("column '{}' appears more than once in the header", column),
                ));
            }
        }

        let mut rows = Vec::new();
        for (line, record) in records.into_iter().enumerate() {
            let cells: Vec<Option<String>> = record
                .into_iter()
                .map(|cell| {
                    let cell = cell.as_ref().trim();
                    (!is_null_token(cell)).then(|| cell.to_string())
                })
                .collect();

            if cells.len() != columns.len() {
                return Err(SourceError::malformed(
                    &name,
                    format!(
                        "record {} has {} fields, header has {}",
                        line + 1,
                        cells.len(),
                        columns.len()
                    ),
                ));
            }

            rows.push(columns.iter().cloned().zip(cells).collect());
        }

        Ok(Self { name, columns, rows })
    }

    /// Source identifier the rows were loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Non-null cells of one column, in row order.
    pub fn non_null_cells<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column).and_then(|cell| cell.as_deref()))
    }

    /// Returns a new row set with columns renamed by `mapping`
    /// (source column to field name). Unmapped columns keep their names.
    pub fn rename_columns(&self, mapping: &BTreeMap<String, String>) -> SourceResult<RowSet> {
        for from in mapping.keys() {
            if !self.has_column(from) {
                return Err(SourceError::UnknownColumn {
                    source_id: self.name.clone(),
                    column: from.clone(),
                });
            }
        }

        let rename = |column: &String| mapping.get(column).unwrap_or(column).clone();

        let columns: Vec<String> = self.columns.iter().map(rename).collect();
        let mut seen = HashSet::new();
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(SourceError::malformed(
                &self.name,
                format!("renaming produces column '{}' twice", dup),
            ));
        }

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(column, cell)| (rename(column), cell.clone()))
                    .collect()
            })
            .collect();

        Ok(RowSet {
            name: self.name.clone(),
            columns,
            rows,
        })
    }

    /// Inferred type, null count and distinct count for every column.
    pub fn describe(&self) -> Vec<ColumnProfile> {
        self.columns
            .iter()
            .map(|column| {
                let cells: Vec<&str> = self.non_null_cells(column).collect();
                let distinct = cells.iter().collect::<HashSet<_>>().len();
                ColumnProfile {
                    name: column.clone(),
                    inferred_type: observed_type(cells.iter().copied(), None),
                    nulls: self.rows.len() - cells.len(),
                    distinct,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goods() -> RowSet {
        RowSet::from_records(
            "goods.csv",
            &["Id", "Flavor", "Price"],
            vec![
                vec!["20-BC-C-10", "Chocolate", "8.95"],
                vec!["20-BC-L-10", " Lemon ", "8.95"],
                vec!["45-CO", "NA", "4"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_cells_trimmed_and_nulls_normalised() {
        let rows = goods();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.rows()[1]["Flavor"].as_deref(), Some("Lemon"));
        assert_eq!(rows.rows()[2]["Flavor"], None);
    }

    #[test]
    fn test_ragged_record_is_malformed() {
        let err = RowSet::from_records("x", &["a", "b"], vec![vec!["1"]]).unwrap_err();
        assert_eq!(err.code(), "TABLOAD_MALFORMED_SOURCE");
    }

    #[test]
    fn test_duplicate_header_is_malformed() {
        let records: Vec<Vec<&str>> = Vec::new();
        let err = RowSet::from_records("x", &["a", "a"], records).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rename_columns() {
        let mut mapping = BTreeMap::new();
        mapping.insert("Id".to_string(), "id".to_string());
        mapping.insert("Price".to_string(), "price".to_string());

        let renamed = goods().rename_columns(&mapping).unwrap();
        assert_eq!(renamed.columns(), &["id", "Flavor", "price"]);
        assert_eq!(renamed.rows()[0]["price"].as_deref(), Some("8.95"));
        assert!(!renamed.rows()[0].contains_key("Price"));
    }

    #[test]
    fn test_rename_unknown_column() {
        let mut mapping = BTreeMap::new();
        mapping.insert("Cost".to_string(), "price".to_string());
        let err = goods().rename_columns(&mapping).unwrap_err();
        assert_eq!(err.code(), "TABLOAD_UNKNOWN_COLUMN");
    }

    #[test]
    fn test_rename_collision() {
        let mut mapping = BTreeMap::new();
        mapping.insert("Id".to_string(), "Flavor".to_string());
        assert!(goods().rename_columns(&mapping).is_err());
    }

    #[test]
    fn test_describe() {
        let profile = goods().describe();
        assert_eq!(profile[0].inferred_type, Some(FieldType::Text));
        assert_eq!(profile[1].nulls, 1);
        assert_eq!(profile[2].inferred_type, Some(FieldType::Decimal));
        assert_eq!(profile[2].distinct, 2);
    }
}
