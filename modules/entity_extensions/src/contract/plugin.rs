//! Plugin contract for contributing extension schemas and data
//!
//! Plugins are called in registration order. Every hook either mutates the
//! shared accumulator in place or returns a replacement that becomes the input
//! of the next plugin.

use super::model::{ExtensionData, TableSpec};
use async_trait::async_trait;

/// Mutable accumulator handed to `on_describe_schema`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaBuilder {
    /// Explicit id column; derived from the entity type when left unset
    pub id_column: Option<String>,
    /// Explicit id accessors; derived from the id column when left empty
    pub id_accessors: Vec<String>,
    pub entity_tables: Vec<TableSpec>,
    pub locale_tables: Vec<TableSpec>,
    pub scope_tables: Vec<TableSpec>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.id_column = Some(column.into());
        self
    }

    pub fn id_accessor(&mut self, accessor: impl Into<String>) -> &mut Self {
        self.id_accessors.push(accessor.into());
        self
    }

    /// Append a table to the list matching its scope
    pub fn add_table(&mut self, table: TableSpec) -> &mut Self {
        use super::model::Scope;

        match table.scope {
            Scope::Entity => self.entity_tables.push(table),
            Scope::Locale => self.locale_tables.push(table),
            Scope::Shop => self.scope_tables.push(table),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entity_tables.is_empty()
            && self.locale_tables.is_empty()
            && self.scope_tables.is_empty()
    }
}

/// Input of the Persist-Extension-Data broadcast
#[derive(Debug, Clone, Copy)]
pub struct PersistRequest<'a> {
    pub entity_type: &'a str,
    pub entity_id: i64,
    /// Extension data as persisted, locale/shop tables in row form
    pub extension_data: &'a ExtensionData,
    /// Native entity data, for cross-field rules
    pub entity_data: &'a ExtensionData,
}

/// An installed plugin taking part in the extension broadcasts
///
/// Every hook has a no-op default so a plugin only implements what it needs.
#[async_trait]
pub trait ExtensionPlugin: Send + Sync {
    /// Plugin name used in logs
    fn name(&self) -> &str;

    /// Describe-Schema: append tables for `entity_type`, or return a replacement
    fn on_describe_schema(
        &self,
        entity_type: &str,
        schema: &mut SchemaBuilder,
    ) -> Option<SchemaBuilder> {
        let _ = (entity_type, schema);
        None
    }

    /// Load-Extension-Data: enrich `data`, or return a replacement
    async fn on_load_data(
        &self,
        entity_type: &str,
        entity_id: i64,
        data: &mut ExtensionData,
    ) -> anyhow::Result<Option<ExtensionData>> {
        let _ = (entity_type, entity_id, data);
        Ok(None)
    }

    /// Persist-Extension-Data: fire-and-forget, errors are only logged
    async fn on_persist_data(&self, request: &PersistRequest<'_>) -> anyhow::Result<()> {
        let _ = request;
        Ok(())
    }
}
