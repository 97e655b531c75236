//! Built-in schema catalogs
//!
//! Two datasets are shipped: the bakery (customers, goods, receipts, items)
//! and the school roster (teachers, students). Each entity also carries the
//! default mapping from its source file's header to field names.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::errors::SchemaResult;
use super::registry::SchemaRegistry;
use super::types::{FieldDef, FieldType, Schema};

/// Built-in dataset catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Bakery,
    Students,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Bakery => "bakery",
            Dataset::Students => "students",
        }
    }

    /// Builds the registry for this dataset
    pub fn registry(&self) -> SchemaResult<SchemaRegistry> {
        match self {
            Dataset::Bakery => bakery(),
            Dataset::Students => students(),
        }
    }

    /// Default source-header to field-name mapping for one entity
    pub fn column_map(&self, entity: &str) -> BTreeMap<String, String> {
        let pairs: &[(&str, &str)] = match (self, entity) {
            (Dataset::Bakery, "customers") => {
                &[("Id", "id"), ("LastName", "last_name"), ("FirstName", "first_name")]
            }
            (Dataset::Bakery, "goods") => &[
                ("Id", "id"),
                ("Flavor", "flavor"),
                ("Food", "food"),
                ("Price", "price"),
            ],
            // The source header really is misspelled.
            (Dataset::Bakery, "receipts") => &[
                ("RecieptNumber", "receipt_number"),
                ("Date", "date"),
                ("CustomerId", "customer_id"),
            ],
            (Dataset::Bakery, "items") => {
                &[("Receipt", "receipt"), ("Ordinal", "ordinal"), ("Item", "item")]
            }
            (Dataset::Students, "teachers") => {
                &[("Last", "last_name"), ("First", "first_name"), ("Classroom", "classroom")]
            }
            (Dataset::Students, "students") => &[
                ("LastName", "last_name"),
                ("FirstName", "first_name"),
                ("Grade", "grade"),
                ("Classroom", "classroom"),
            ],
            _ => &[],
        };

        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bakery" => Ok(Dataset::Bakery),
            "students" => Ok(Dataset::Students),
            other => Err(format!(
                "unknown catalog '{}': expected 'bakery' or 'students'",
                other
            )),
        }
    }
}

/// Bakery dataset: customers, goods, receipts and receipt line items.
pub fn bakery() -> SchemaResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();

    registry.register(
        Schema::new(
            "customers",
            vec![
                FieldDef::key("id", FieldType::Integer),
                FieldDef::required("last_name", FieldType::Text),
                FieldDef::required("first_name", FieldType::Text),
            ],
        )
        .with_description("Bakery customers"),
    )?;

    registry.register(
        Schema::new(
            "goods",
            vec![
                FieldDef::key("id", FieldType::Text),
                FieldDef::required("flavor", FieldType::Text),
                FieldDef::required("food", FieldType::Text),
                FieldDef::required("price", FieldType::Decimal),
            ],
        )
        .with_description("Baked goods and their prices"),
    )?;

    registry.register(
        Schema::new(
            "receipts",
            vec![
                FieldDef::key("receipt_number", FieldType::Integer),
                FieldDef::required("date", FieldType::Date),
                FieldDef::required("customer_id", FieldType::Integer).references("customers", "id"),
            ],
        )
        .with_description("Purchase receipts"),
    )?;

    registry.register(
        Schema::new(
            "items",
            vec![
                FieldDef::key("receipt", FieldType::Integer).references("receipts", "receipt_number"),
                FieldDef::key("ordinal", FieldType::Integer),
                FieldDef::required("item", FieldType::Text).references("goods", "id"),
            ],
        )
        .with_description("Line items of each receipt"),
    )?;

    Ok(registry)
}

/// School roster dataset: teachers and the students in their classrooms.
pub fn students() -> SchemaResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();

    registry.register(Schema::new(
        "teachers",
        vec![
            FieldDef::required("last_name", FieldType::Text),
            FieldDef::required("first_name", FieldType::Text),
            FieldDef::key("classroom", FieldType::Integer),
        ],
    ))?;

    registry.register(Schema::new(
        "students",
        vec![
            FieldDef::key("last_name", FieldType::Text),
            FieldDef::key("first_name", FieldType::Text),
            FieldDef::optional("grade", FieldType::Integer),
            FieldDef::required("classroom", FieldType::Integer).references("teachers", "classroom"),
        ],
    ))?;

    Ok(registry)
}
