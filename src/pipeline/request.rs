//! Pipeline inputs

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::consistency::Policy;
use crate::source::{self, RowSet, SourceError, SourceOptions, SourceResult};

/// Whether a report with findings may proceed to commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcceptPolicy {
    /// Only a clean report is committed
    #[default]
    RequireClean,
    /// Findings are logged and the batch is committed anyway
    AcceptFindings,
}

/// A source file bound to the entity it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySource {
    pub entity: String,
    pub path: PathBuf,
    /// Source column name to field name
    pub column_map: BTreeMap<String, String>,
}

impl EntitySource {
    pub fn new(entity: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            entity: entity.into(),
            path: path.into(),
            column_map: BTreeMap::new(),
        }
    }

    pub fn with_column_map(mut self, column_map: BTreeMap<String, String>) -> Self {
        self.column_map = column_map;
        self
    }

    /// Reads the file and renames its columns to field names.
    pub fn read(&self, options: &SourceOptions) -> SourceResult<RowSet> {
        let rows = source::load_with(&self.path, options)?;
        apply_column_map(&rows, &self.column_map)
    }
}

/// Renames columns per `column_map`.
///
/// An entry whose source column is absent is satisfied if the target field
/// is already a column; otherwise the source column is unknown.
fn apply_column_map(rows: &RowSet, column_map: &BTreeMap<String, String>) -> SourceResult<RowSet> {
    let mut effective = BTreeMap::new();
    for (column, field) in column_map {
        if rows.has_column(column) {
            effective.insert(column.clone(), field.clone());
        } else if !rows.has_column(field) {
            return Err(SourceError::UnknownColumn {
                source_id: rows.name().to_string(),
                column: column.clone(),
            });
        }
    }
    rows.rename_columns(&effective)
}

/// Load one source file into one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub source: EntitySource,
    pub options: SourceOptions,
    pub policy: AcceptPolicy,
}

impl LoadRequest {
    pub fn new(source: EntitySource) -> Self {
        Self {
            source,
            options: SourceOptions::default(),
            policy: AcceptPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AcceptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }
}

/// Check a child source's link column against a parent source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub parent: EntitySource,
    pub child: EntitySource,
    pub link_field: String,
    pub policy: Policy,
    pub options: SourceOptions,
}

impl LinkRequest {
    pub fn new(parent: EntitySource, child: EntitySource, link_field: impl Into<String>) -> Self {
        Self {
            parent,
            child,
            link_field: link_field.into(),
            policy: Policy::default(),
            options: SourceOptions::default(),
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }
}
