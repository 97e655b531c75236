//! In-memory schema registry
//!
//! - One entry per entity name, immutable after registration
//! - Foreign keys must point at a key field of an already registered entity
//! - Schema files are stored as `<dir>/<entity>.json`, one entity per file

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, Schema};

/// Registry of schema entries, kept in registration order so that parents
/// always precede the children that reference them.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<Schema>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity with its ordered field list.
    pub fn define(&mut self, entity: impl Into<String>, fields: Vec<FieldDef>) -> SchemaResult<()> {
        self.register(Schema::new(entity, fields))
    }

    /// Registers a complete schema entry.
    ///
    /// Fails if the entity is already registered, if the entry is
    /// structurally invalid, or if a foreign key does not resolve to a key
    /// field of a registered entity.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        schema
            .validate_structure()
            .map_err(|reason| SchemaError::invalid_definition(&schema.entity, reason))?;

        if self.index.contains_key(&schema.entity) {
            return Err(SchemaError::DuplicateEntity(schema.entity));
        }

        for field in &schema.fields {
            if let Some(fk) = &field.references {
                self.check_reference(&schema, field, &fk.entity, &fk.field)?;
            }
        }

        debug!(entity = %schema.entity, fields = schema.fields.len(), "schema registered");
        self.index.insert(schema.entity.clone(), self.schemas.len());
        self.schemas.push(schema);
        Ok(())
    }

    fn check_reference(
        &self,
        schema: &Schema,
        field: &FieldDef,
        parent_entity: &str,
        parent_field: &str,
    ) -> SchemaResult<()> {
        // Self-references resolve against the entry being registered.
        let parent = if parent_entity == schema.entity {
            Some(schema)
        } else {
            self.get(parent_entity)
        };

        let parent = parent.ok_or_else(|| {
            SchemaError::invalid_definition(
                &schema.entity,
                format!(
                    "field '{}' references unknown entity '{}'",
                    field.name, parent_entity
                ),
            )
        })?;

        let target = parent.field(parent_field).ok_or_else(|| {
            SchemaError::invalid_definition(
                &schema.entity,
                format!(
                    "field '{}' references unknown field '{}.{}'",
                    field.name, parent_entity, parent_field
                ),
            )
        })?;

        if !target.key {
            return Err(SchemaError::invalid_definition(
                &schema.entity,
                format!(
                    "field '{}' references non-key field '{}.{}'",
                    field.name, parent_entity, parent_field
                ),
            ));
        }

        if target.field_type != field.field_type {
            return Err(SchemaError::invalid_definition(
                &schema.entity,
                format!(
                    "field '{}' is {} but '{}.{}' is {}",
                    field.name, field.field_type, parent_entity, parent_field, target.field_type
                ),
            ));
        }

        Ok(())
    }

    /// Returns the schema entry for an entity.
    pub fn lookup(&self, entity: &str) -> SchemaResult<&Schema> {
        self.get(entity)
            .ok_or_else(|| SchemaError::UnknownEntity(entity.to_string()))
    }

    pub fn get(&self, entity: &str) -> Option<&Schema> {
        self.index.get(entity).map(|&i| &self.schemas[i])
    }

    pub fn exists(&self, entity: &str) -> bool {
        self.index.contains_key(entity)
    }

    /// Entity schemas in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registers every `*.json` file in `dir`.
    ///
    /// Files are read in name order and registered parents first, so an
    /// entity may reference one whose file sorts after it.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed_schema_file(
                dir.display().to_string(),
                format!("failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema_file(
                    dir.display().to_string(),
                    format!("failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut pending = paths
            .iter()
            .map(|path| read_schema_file(path))
            .collect::<SchemaResult<Vec<_>>>()?;
        let count = pending.len();

        while !pending.is_empty() {
            let ready = pending.iter().position(|schema| {
                schema
                    .fields
                    .iter()
                    .filter_map(|field| field.references.as_ref())
                    .all(|fk| fk.entity == schema.entity || self.exists(&fk.entity))
            });
            // With nothing ready, registering the first entry reports why.
            let schema = pending.remove(ready.unwrap_or(0));
            self.register(schema)?;
        }

        Ok(count)
    }

    /// Registers a single schema file.
    pub fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        self.register(read_schema_file(path)?)
    }

    /// Writes a schema entry to `<dir>/<entity>.json`.
    pub fn save_schema(&self, dir: &Path, schema: &Schema) -> SchemaResult<PathBuf> {
        let path = dir.join(format!("{}.json", schema.entity));

        let content = serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::malformed_schema_file(
                path.display().to_string(),
                format!("failed to serialize schema: {}", e),
            )
        })?;

        fs::create_dir_all(dir)
            .and_then(|_| fs::write(&path, content))
            .map_err(|e| {
                SchemaError::malformed_schema_file(
                    path.display().to_string(),
                    format!("failed to write file: {}", e),
                )
            })?;

        Ok(path)
    }
}

fn read_schema_file(path: &Path) -> SchemaResult<Schema> {
    let content = fs::read_to_string(path).map_err(|e| {
        SchemaError::malformed_schema_file(
            path.display().to_string(),
            format!("failed to read file: {}", e),
        )
    })?;

    serde_json::from_str(&content).map_err(|e| {
        SchemaError::malformed_schema_file(path.display().to_string(), format!("invalid JSON: {}", e))
    })
}
