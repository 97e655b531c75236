//! Validation report types

use std::fmt;

use serde::Serialize;

use crate::schema::FieldType;

/// A column whose observed type differs from its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMismatch {
    pub field: String,
    pub observed: FieldType,
    pub expected: FieldType,
}

/// A required field absent from some rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    pub field: String,
    /// Rows lacking the field
    pub rows: usize,
}

/// A required field holding nulls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullViolation {
    pub field: String,
    pub count: usize,
}

/// A key tuple that occurs more than once in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKeyValue {
    /// Canonical key values in key-field order, `None` for null
    pub values: Vec<Option<String>>,
    pub occurrences: usize,
}

/// Data-quality findings for one (schema entry, row set) pair.
///
/// An empty report means the row set is clean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub entity: String,
    pub rows: usize,
    pub type_mismatches: Vec<TypeMismatch>,
    pub missing_fields: Vec<MissingField>,
    pub null_violations: Vec<NullViolation>,
    /// Fewer distinct key tuples than rows
    pub duplicate_keys: bool,
    pub duplicates: Vec<DuplicateKeyValue>,
}

impl ValidationReport {
    pub fn new(entity: impl Into<String>, rows: usize) -> Self {
        Self {
            entity: entity.into(),
            rows,
            type_mismatches: Vec::new(),
            missing_fields: Vec::new(),
            null_violations: Vec::new(),
            duplicate_keys: false,
            duplicates: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    /// Number of itemised findings
    pub fn issue_count(&self) -> usize {
        self.type_mismatches.len()
            + self.missing_fields.len()
            + self.null_violations.len()
            + self.duplicates.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "{}: clean ({} rows)", self.entity, self.rows);
        }

        writeln!(f, "{}: {} issue(s) in {} rows", self.entity, self.issue_count(), self.rows)?;
        for m in &self.type_mismatches {
            writeln!(f, "  type mismatch: '{}' expected {}, observed {}", m.field, m.expected, m.observed)?;
        }
        for m in &self.missing_fields {
            writeln!(f, "  missing field: '{}' absent from {} row(s)", m.field, m.rows)?;
        }
        for n in &self.null_violations {
            writeln!(f, "  null violation: '{}' has {} null(s)", n.field, n.count)?;
        }
        for d in &self.duplicates {
            let values: Vec<&str> = d.values.iter().map(|v| v.as_deref().unwrap_or("NULL")).collect();
            writeln!(f, "  duplicate key: ({}) x{}", values.join(", "), d.occurrences)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_clean() {
        let report = ValidationReport::new("customers", 3);
        assert!(report.is_clean());
        assert_eq!(report.to_string(), "customers: clean (3 rows)");
    }

    #[test]
    fn test_display_lists_findings() {
        let mut report = ValidationReport::new("goods", 2);
        report.type_mismatches.push(TypeMismatch {
            field: "price".into(),
            observed: FieldType::Text,
            expected: FieldType::Decimal,
        });
        report.duplicate_keys = true;
        report.duplicates.push(DuplicateKeyValue {
            values: vec![Some("90-APR-PF".into())],
            occurrences: 2,
        });

        assert_eq!(report.issue_count(), 2);
        let text = report.to_string();
        assert!(text.contains("price"));
        assert!(text.contains("90-APR-PF"));
    }
}
