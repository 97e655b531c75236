//! Row set validator
//!
//! Validation semantics:
//! - Every declared field must be a column of the row set (hard error)
//! - Observed column type must equal the declared type
//! - Required fields must be present in every row and never null
//! - Key tuples must be distinct across the batch
//!
//! Data-quality findings are collected into the report, never raised.
//! Validation does not mutate its inputs and is deterministic.

use std::collections::HashMap;

use tracing::{debug, info};

use super::report::{
    DuplicateKeyValue, MissingField, NullViolation, TypeMismatch, ValidationReport,
};
use crate::schema::{Schema, SchemaError, SchemaRegistry, SchemaResult};
use crate::source::RowSet;
use crate::value::{canonical_key, observed_type};

/// Checks a row set against a schema entry.
pub fn validate(schema: &Schema, rows: &RowSet) -> SchemaResult<ValidationReport> {
    for field in &schema.fields {
        if !rows.has_column(&field.name) {
            return Err(SchemaError::missing_column(&schema.entity, &field.name));
        }
    }

    let mut report = ValidationReport::new(&schema.entity, rows.len());

    for field in &schema.fields {
        let name = field.name.as_str();

        if let Some(observed) = observed_type(rows.non_null_cells(name), Some(field.field_type)) {
            if observed != field.field_type {
                debug!(entity = %schema.entity, field = name, %observed, "type mismatch");
                report.type_mismatches.push(TypeMismatch {
                    field: field.name.clone(),
                    observed,
                    expected: field.field_type,
                });
            }
        }

        if !field.is_required() {
            continue;
        }

        let absent = rows.rows().iter().filter(|row| !row.contains_key(name)).count();
        if absent > 0 {
            report.missing_fields.push(MissingField {
                field: field.name.clone(),
                rows: absent,
            });
        }

        let nulls = rows
            .rows()
            .iter()
            .filter(|row| matches!(row.get(name), Some(None)))
            .count();
        if nulls > 0 {
            report.null_violations.push(NullViolation {
                field: field.name.clone(),
                count: nulls,
            });
        }
    }

    check_key_uniqueness(schema, rows, &mut report);

    info!(
        entity = %schema.entity,
        rows = rows.len(),
        issues = report.issue_count(),
        "validation complete"
    );
    Ok(report)
}

fn check_key_uniqueness(schema: &Schema, rows: &RowSet, report: &mut ValidationReport) {
    let key_fields: Vec<_> = schema.key_fields().collect();
    if key_fields.is_empty() {
        return;
    }

    // First-seen order keeps the duplicate list deterministic.
    let mut order: Vec<Vec<Option<String>>> = Vec::new();
    let mut counts: HashMap<Vec<Option<String>>, usize> = HashMap::new();

    for row in rows.rows() {
        let tuple: Vec<Option<String>> = key_fields
            .iter()
            .map(|field| {
                row.get(&field.name)
                    .and_then(|cell| cell.as_deref())
                    .map(|raw| canonical_key(Some(raw), field.field_type))
            })
            .collect();

        let count = counts.entry(tuple.clone()).or_insert(0);
        if *count == 0 {
            order.push(tuple);
        }
        *count += 1;
    }

    report.duplicate_keys = counts.len() < rows.len();
    report.duplicates = order
        .into_iter()
        .filter_map(|values| {
            let occurrences = counts[&values];
            (occurrences > 1).then_some(DuplicateKeyValue { values, occurrences })
        })
        .collect();
}

/// Validator bound to a registry, for callers that address entities by name.
pub struct SchemaValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Looks up `entity` and validates `rows` against it.
    pub fn validate_entity(&self, entity: &str, rows: &RowSet) -> SchemaResult<ValidationReport> {
        let schema = self.registry.lookup(entity)?;
        validate(schema, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldType};
    use crate::source::Row;

    fn customers() -> Schema {
        Schema::new(
            "customers",
            vec![
                FieldDef::key("id", FieldType::Integer),
                FieldDef::required("last_name", FieldType::Text),
                FieldDef::optional("first_name", FieldType::Text),
            ],
        )
    }

    fn rows(records: Vec<Vec<&str>>) -> RowSet {
        RowSet::from_records("customers.csv", &["id", "last_name", "first_name"], records).unwrap()
    }

    #[test]
    fn test_clean_row_set() {
        let report = validate(
            &customers(),
            &rows(vec![vec!["1", "LOGAN", "JULIET"], vec!["2", "ARZT", ""]]),
        )
        .unwrap();
        assert!(report.is_clean());
        assert!(!report.duplicate_keys);
    }

    #[test]
    fn test_missing_column_is_hard_error() {
        let rows = RowSet::from_records("c.csv", &["id", "first_name"], vec![vec!["1", "A"]]).unwrap();
        let err = validate(&customers(), &rows).unwrap_err();
        assert_eq!(err.code(), "TABLOAD_SCHEMA_VIOLATION");
        assert!(err.to_string().contains("last_name"));
    }

    #[test]
    fn test_one_mismatch_per_column() {
        let report = validate(
            &customers(),
            &rows(vec![
                vec!["1", "LOGAN", "JULIET"],
                vec!["two", "ARZT", "TERRELL"],
                vec!["three", "ESPOSITA", "TRAVIS"],
            ]),
        )
        .unwrap();
        assert_eq!(report.type_mismatches.len(), 1);
        assert_eq!(report.type_mismatches[0].field, "id");
        assert_eq!(report.type_mismatches[0].observed, FieldType::Text);
        assert_eq!(report.type_mismatches[0].expected, FieldType::Integer);
    }

    #[test]
    fn test_all_null_required_column_is_null_violation() {
        let report = validate(
            &customers(),
            &rows(vec![vec!["1", "", "A"], vec!["2", "NA", "B"]]),
        )
        .unwrap();
        assert!(report.type_mismatches.is_empty());
        assert_eq!(
            report.null_violations,
            vec![NullViolation {
                field: "last_name".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_nullable_field_allows_nulls() {
        let report = validate(&customers(), &rows(vec![vec!["1", "LOGAN", ""]])).unwrap();
        assert!(report.null_violations.is_empty());
    }

    #[test]
    fn test_rows_lacking_required_field() {
        let mut full = Row::new();
        full.insert("id".into(), Some("1".into()));
        full.insert("last_name".into(), Some("LOGAN".into()));
        full.insert("first_name".into(), None);
        let mut partial = Row::new();
        partial.insert("id".into(), Some("2".into()));

        let rows = RowSet::new(
            "programmatic",
            vec!["id".into(), "last_name".into(), "first_name".into()],
            vec![full, partial],
        );
        let report = validate(&customers(), &rows).unwrap();
        assert_eq!(
            report.missing_fields,
            vec![MissingField {
                field: "last_name".into(),
                rows: 1
            }]
        );
        assert!(report.null_violations.is_empty());
    }

    #[test]
    fn test_single_duplicate_detected_once() {
        let report = validate(
            &customers(),
            &rows(vec![
                vec!["1", "LOGAN", "JULIET"],
                vec!["2", "ARZT", "TERRELL"],
                vec!["02", "ESPOSITA", "TRAVIS"],
            ]),
        )
        .unwrap();
        assert!(report.duplicate_keys);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].values, vec![Some("2".to_string())]);
        assert_eq!(report.duplicates[0].occurrences, 2);
    }

    #[test]
    fn test_composite_key() {
        let schema = Schema::new(
            "items",
            vec![
                FieldDef::key("receipt", FieldType::Integer),
                FieldDef::key("ordinal", FieldType::Integer),
                FieldDef::required("item", FieldType::Text),
            ],
        );
        let rows = RowSet::from_records(
            "items.csv",
            &["receipt", "ordinal", "item"],
            vec![
                vec!["18129", "1", "70-TU"],
                vec!["18129", "2", "70-TU"],
                vec!["51991", "1", "90-APIE-10"],
            ],
        )
        .unwrap();
        let report = validate(&schema, &rows).unwrap();
        assert!(!report.duplicate_keys);
    }

    #[test]
    fn test_validator_unknown_entity() {
        let registry = SchemaRegistry::new();
        let validator = SchemaValidator::new(&registry);
        let err = validator
            .validate_entity("customers", &rows(vec![]))
            .unwrap_err();
        assert_eq!(err.code(), "TABLOAD_UNKNOWN_ENTITY");
    }
}
