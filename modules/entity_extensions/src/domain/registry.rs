//! Plugin broadcasts and the process-scoped extension schema cache

use super::validation::sanitize_schema;
use crate::contract::{EntitySchema, ExtensionData, ExtensionPlugin, PersistRequest, SchemaBuilder};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Installed plugins in registration order
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn ExtensionPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Arc<dyn ExtensionPlugin>) -> &mut Self {
        tracing::debug!(plugin = plugin.name(), "Registered extension plugin");
        self.plugins.push(plugin);
        self
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ExtensionPlugin>> {
        self.plugins.iter()
    }

    /// Describe-Schema broadcast over an empty accumulator
    pub fn describe_schema(&self, entity_type: &str) -> SchemaBuilder {
        let mut schema = SchemaBuilder::new();
        for plugin in &self.plugins {
            if let Some(replacement) = plugin.on_describe_schema(entity_type, &mut schema) {
                tracing::debug!(
                    plugin = plugin.name(),
                    entity_type,
                    "Plugin replaced schema accumulator"
                );
                schema = replacement;
            }
        }
        schema
    }

    /// Load-Extension-Data broadcast; the last returned replacement wins
    pub async fn load_data(
        &self,
        entity_type: &str,
        entity_id: i64,
        mut data: ExtensionData,
    ) -> anyhow::Result<ExtensionData> {
        for plugin in &self.plugins {
            if let Some(replacement) =
                plugin.on_load_data(entity_type, entity_id, &mut data).await?
            {
                data = replacement;
            }
        }
        Ok(data)
    }

    /// Persist-Extension-Data broadcast; handler failures are logged and skipped
    pub async fn persist_data(&self, request: &PersistRequest<'_>) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_persist_data(request).await {
                tracing::warn!(
                    plugin = plugin.name(),
                    entity_type = request.entity_type,
                    entity_id = request.entity_id,
                    "Persist hook failed: {e:#}"
                );
            }
        }
    }
}

/// Extension schemas per entity type, built lazily and kept for the process lifetime
pub struct ExtensionRegistry {
    plugins: Arc<PluginRegistry>,
    id_column_prefix: String,
    cache: RwLock<HashMap<String, Arc<EntitySchema>>>,
}

impl ExtensionRegistry {
    pub fn new(plugins: Arc<PluginRegistry>, id_column_prefix: impl Into<String>) -> Self {
        Self {
            plugins,
            id_column_prefix: id_column_prefix.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn plugins(&self) -> &Arc<PluginRegistry> {
        &self.plugins
    }

    /// Cached schema, running the Describe-Schema broadcast on first access
    pub fn get_schema(&self, entity_type: &str) -> Arc<EntitySchema> {
        if let Some(schema) = self.cache.read().get(entity_type) {
            return schema.clone();
        }

        // Built outside the lock: plugins run arbitrary code and rebuilding is idempotent
        let builder = self.plugins.describe_schema(entity_type);
        let schema = Arc::new(sanitize_schema(entity_type, builder, &self.id_column_prefix));
        tracing::info!(
            entity_type,
            entity_tables = schema.entity_tables.len(),
            locale_tables = schema.locale_tables.len(),
            scope_tables = schema.scope_tables.len(),
            "Built extension schema"
        );

        self.cache
            .write()
            .entry(entity_type.to_string())
            .or_insert(schema)
            .clone()
    }

    pub fn has_extensions(&self, entity_type: &str) -> bool {
        self.get_schema(entity_type).has_extensions()
    }

    /// Drop every cached schema; the next access rebuilds it
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }
}
