//! Cross-table consistency checker
//!
//! Compares the distinct values of a link column in a child row set with the
//! distinct values of the matching key in a parent row set. Inconsistency is
//! a result, not an error.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::schema::{FieldDef, Schema, SchemaError, SchemaResult};
use crate::source::RowSet;
use crate::value::canonical_key;

/// How the child value set must relate to the parent's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Every child value exists in the parent
    #[default]
    Subset,
    /// Child and parent value sets are identical
    Equal,
}

/// Outcome of a consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub parent: String,
    pub parent_field: String,
    pub child: String,
    pub child_field: String,
    pub policy: Policy,
    pub consistent: bool,
    /// Child values absent from the parent
    pub child_only: BTreeSet<String>,
    /// Parent values no child refers to
    pub parent_only: BTreeSet<String>,
}

impl ConsistencyReport {
    /// Values in exactly one of the two sets
    pub fn symmetric_difference(&self) -> BTreeSet<String> {
        self.child_only.union(&self.parent_only).cloned().collect()
    }

    /// Values that make the check fail under the report's policy
    pub fn offending(&self) -> BTreeSet<String> {
        match self.policy {
            Policy::Subset => self.child_only.clone(),
            Policy::Equal => self.symmetric_difference(),
        }
    }
}

/// Checks that `link_field` in `child_rows` refers only to key values
/// present in `parent_rows`.
pub fn check_consistency(
    parent_schema: &Schema,
    parent_rows: &RowSet,
    child_schema: &Schema,
    child_rows: &RowSet,
    link_field: &str,
    policy: Policy,
) -> SchemaResult<ConsistencyReport> {
    let child_field = child_schema.field(link_field).ok_or_else(|| {
        SchemaError::violation(
            &child_schema.entity,
            format!("link field '{}' is not declared", link_field),
        )
    })?;
    let parent_field = resolve_parent_field(parent_schema, child_schema, child_field)?;

    if !child_rows.has_column(&child_field.name) {
        return Err(SchemaError::missing_column(&child_schema.entity, &child_field.name));
    }
    if !parent_rows.has_column(&parent_field.name) {
        return Err(SchemaError::missing_column(&parent_schema.entity, &parent_field.name));
    }

    // Both sides are canonicalised under the parent key's type.
    let ty = parent_field.field_type;
    let child_values: BTreeSet<String> = child_rows
        .non_null_cells(&child_field.name)
        .map(|raw| canonical_key(Some(raw), ty))
        .collect();
    let parent_values: BTreeSet<String> = parent_rows
        .non_null_cells(&parent_field.name)
        .map(|raw| canonical_key(Some(raw), ty))
        .collect();

    let child_only: BTreeSet<String> = child_values.difference(&parent_values).cloned().collect();
    let parent_only: BTreeSet<String> = parent_values.difference(&child_values).cloned().collect();

    let consistent = match policy {
        Policy::Subset => child_only.is_empty(),
        Policy::Equal => child_only.is_empty() && parent_only.is_empty(),
    };

    info!(
        parent = %parent_schema.entity,
        child = %child_schema.entity,
        link = link_field,
        consistent,
        child_only = child_only.len(),
        parent_only = parent_only.len(),
        "consistency checked"
    );

    Ok(ConsistencyReport {
        parent: parent_schema.entity.clone(),
        parent_field: parent_field.name.clone(),
        child: child_schema.entity.clone(),
        child_field: child_field.name.clone(),
        policy,
        consistent,
        child_only,
        parent_only,
    })
}

/// The child field's declared reference wins; otherwise the parent field of
/// the same name is used.
fn resolve_parent_field<'p>(
    parent_schema: &'p Schema,
    child_schema: &Schema,
    child_field: &FieldDef,
) -> SchemaResult<&'p FieldDef> {
    let target = match &child_field.references {
        Some(fk) if fk.entity != parent_schema.entity => {
            return Err(SchemaError::violation(
                &child_schema.entity,
                format!(
                    "field '{}' references '{}', not '{}'",
                    child_field.name, fk.entity, parent_schema.entity
                ),
            ));
        }
        Some(fk) => fk.field.as_str(),
        None => child_field.name.as_str(),
    };

    parent_schema.field(target).ok_or_else(|| {
        SchemaError::violation(
            &parent_schema.entity,
            format!("no field '{}' to match child field '{}'", target, child_field.name),
        )
    })
}
