//! Built-in plugin serving statically declared extension schemas

use crate::contract::{ExtensionPlugin, SchemaBuilder};
use std::collections::HashMap;

/// Contributes tables declared up front (typically from YAML schema files)
#[derive(Debug, Clone, Default)]
pub struct DeclaredSchemaPlugin {
    declarations: HashMap<String, SchemaBuilder>,
}

impl DeclaredSchemaPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration; a second declaration for the same entity type extends the first
    pub fn declare(
        &mut self,
        entity_type: impl Into<String>,
        declaration: SchemaBuilder,
    ) -> &mut Self {
        let entry = self.declarations.entry(entity_type.into()).or_default();
        if declaration.id_column.is_some() {
            entry.id_column = declaration.id_column;
        }
        entry.id_accessors.extend(declaration.id_accessors);
        entry.entity_tables.extend(declaration.entity_tables);
        entry.locale_tables.extend(declaration.locale_tables);
        entry.scope_tables.extend(declaration.scope_tables);
        self
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl ExtensionPlugin for DeclaredSchemaPlugin {
    fn name(&self) -> &str {
        "declared-schema"
    }

    fn on_describe_schema(
        &self,
        entity_type: &str,
        schema: &mut SchemaBuilder,
    ) -> Option<SchemaBuilder> {
        let declaration = self.declarations.get(entity_type)?;
        if let Some(id_column) = &declaration.id_column {
            schema.id_column(id_column.clone());
        }
        schema.id_accessors.extend(declaration.id_accessors.iter().cloned());
        for table in declaration
            .entity_tables
            .iter()
            .chain(&declaration.locale_tables)
            .chain(&declaration.scope_tables)
        {
            schema.add_table(table.clone());
        }
        None
    }
}
