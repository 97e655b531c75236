//! Schema type definitions
//!
//! Supported semantic types:
//! - integer: 64-bit signed integer
//! - text: UTF-8 string
//! - decimal: 64-bit floating point
//! - date: calendar date without time zone

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Column name the store keeps for itself in every entity table
pub const RESERVED_COLUMN: &str = "_tabload_seq";

/// Semantic field types. Comparison between declared and observed
/// types is exact on this vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// 64-bit signed integer
    Integer,
    /// UTF-8 string
    Text,
    /// 64-bit floating point
    Decimal,
    /// Calendar date
    Date,
}

impl FieldType {
    /// Returns the type name for reports and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Text => "text",
            FieldType::Decimal => "decimal",
            FieldType::Date => "date",
        }
    }

    /// Column type used when creating the table for this field
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldType::Integer => "INTEGER",
            FieldType::Text => "TEXT",
            FieldType::Decimal => "REAL",
            FieldType::Date => "TEXT",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Reference from a field to a key field of another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Parent entity name
    pub entity: String,
    /// Key field of the parent entity
    pub field: String,
}

impl ForeignKey {
    pub fn new(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            field: field.into(),
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, matched case-sensitively against row set columns
    pub name: String,
    /// Expected semantic type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether null values are allowed
    #[serde(default)]
    pub nullable: bool,
    /// Whether the field is part of the entity key
    #[serde(default)]
    pub key: bool,
    /// Optional foreign-key declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKey>,
}

impl FieldDef {
    /// Create a required field
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            key: false,
            references: None,
        }
    }

    /// Create a nullable field
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, field_type)
        }
    }

    /// Create a key field. Key fields are never nullable.
    pub fn key(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: true,
            ..Self::required(name, field_type)
        }
    }

    /// Attach a foreign-key reference
    pub fn references(mut self, entity: impl Into<String>, field: impl Into<String>) -> Self {
        self.references = Some(ForeignKey::new(entity, field));
        self
    }

    /// Whether null values violate this field
    pub fn is_required(&self) -> bool {
        !self.nullable
    }
}

/// Schema entry for one target entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Entity (and table) name
    pub entity: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered field definitions
    pub fields: Vec<FieldDef>,
}

impl Schema {
    /// Create a new schema entry
    pub fn new(entity: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            entity: entity.into(),
            description: None,
            fields,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Key fields in declaration order
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.key)
    }

    pub fn has_key(&self) -> bool {
        self.fields.iter().any(|f| f.key)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Validates the schema structure itself (not a row set).
    ///
    /// References to other entities are checked by the registry.
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.entity.trim().is_empty() {
            return Err("entity name must not be empty".into());
        }

        if self.fields.is_empty() {
            return Err(format!("entity '{}' declares no fields", self.entity));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(format!("entity '{}' has a field with an empty name", self.entity));
            }
            if field.name == RESERVED_COLUMN {
                return Err(format!("field name '{}' is reserved", field.name));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!("field '{}' is declared twice", field.name));
            }
            if field.key && field.nullable {
                return Err(format!("key field '{}' cannot be nullable", field.name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(
            "customers",
            vec![
                FieldDef::key("id", FieldType::Integer),
                FieldDef::required("last_name", FieldType::Text),
                FieldDef::optional("first_name", FieldType::Text),
            ],
        )
    }

    #[test]
    fn test_schema_structure_valid() {
        assert!(sample_schema().validate_structure().is_ok());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = Schema::new(
            "customers",
            vec![
                FieldDef::key("id", FieldType::Integer),
                FieldDef::required("id", FieldType::Text),
            ],
        );
        let result = schema.validate_structure();
        assert!(result.unwrap_err().contains("twice"));
    }

    #[test]
    fn test_reserved_field_name_rejected() {
        let schema = Schema::new(
            "customers",
            vec![
                FieldDef::key("id", FieldType::Integer),
                FieldDef::required(RESERVED_COLUMN, FieldType::Integer),
            ],
        );
        assert!(schema.validate_structure().unwrap_err().contains("reserved"));
    }

    #[test]
    fn test_nullable_key_rejected() {
        let mut field = FieldDef::key("id", FieldType::Integer);
        field.nullable = true;
        let schema = Schema::new("customers", vec![field]);
        assert!(schema.validate_structure().is_err());
    }

    #[test]
    fn test_key_fields_in_order() {
        let schema = Schema::new(
            "items",
            vec![
                FieldDef::key("receipt", FieldType::Integer),
                FieldDef::key("ordinal", FieldType::Integer),
                FieldDef::required("item", FieldType::Text),
            ],
        );
        let keys: Vec<_> = schema.key_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(keys, vec!["receipt", "ordinal"]);
    }

    #[test]
    fn test_field_def_json_shape() {
        let json = r#"{"name":"customer_id","type":"integer","references":{"entity":"customers","field":"id"}}"#;
        let field: FieldDef = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, FieldType::Integer);
        assert!(!field.nullable);
        assert!(!field.key);
        assert_eq!(field.references, Some(ForeignKey::new("customers", "id")));
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::Integer.type_name(), "integer");
        assert_eq!(FieldType::Text.type_name(), "text");
        assert_eq!(FieldType::Decimal.type_name(), "decimal");
        assert_eq!(FieldType::Date.type_name(), "date");
        assert_eq!(FieldType::Decimal.sql_type(), "REAL");
    }
}
