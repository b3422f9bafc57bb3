//! Domain service - extension persistence and retrieval orchestration

use super::casting::{as_positive_id, default_scalar, to_storage, to_wire, Scalar};
use super::converter::Converter;
use super::registry::ExtensionRegistry;
use super::repository::{ExtensionRowRepository, RowQuery, StoredRow, UpsertRow};
use crate::config::JunctionPolicy;
use crate::contract::{
    EntitySchema, ExtensionData, ExtensionError, ExtensionRow, Extraction, FieldSpec,
    PersistRequest, TableSpec,
};
use serde_json::Value;
use std::sync::Arc;

/// Domain service for entity extensions
pub struct Service {
    registry: Arc<ExtensionRegistry>,
    converter: Converter,
    repo: Arc<dyn ExtensionRowRepository>,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        registry: Arc<ExtensionRegistry>,
        converter: Converter,
        repo: Arc<dyn ExtensionRowRepository>,
    ) -> Self {
        Self {
            registry,
            converter,
            repo,
        }
    }

    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    // ===== Schema =====

    pub fn schema(&self, entity_type: &str) -> Arc<EntitySchema> {
        self.registry.get_schema(entity_type)
    }

    pub fn has_extensions(&self, entity_type: &str) -> bool {
        self.registry.has_extensions(entity_type)
    }

    pub fn clear_cache(&self) {
        self.registry.clear_cache();
    }

    // ===== Data =====

    /// Split an inbound payload; payloads of unextended entities pass through
    pub fn extract(
        &self,
        entity_type: &str,
        payload: ExtensionData,
    ) -> Result<Extraction, ExtensionError> {
        let schema = self.registry.get_schema(entity_type);
        if !schema.has_extensions() {
            return Ok(Extraction {
                extension_data: ExtensionData::new(),
                cleaned_payload: payload,
            });
        }
        self.converter.extract(payload, &schema)
    }

    /// Write extension data for one entity.
    ///
    /// Tables without data in `extension_data` are left alone. All statements
    /// are planned before the first write so a rejected value writes nothing.
    pub async fn persist(
        &self,
        entity_type: &str,
        entity_id: i64,
        extension_data: &ExtensionData,
        entity_data: &ExtensionData,
    ) -> Result<(), ExtensionError> {
        let schema = self.registry.get_schema(entity_type);
        if !schema.has_extensions() {
            return Ok(());
        }
        if entity_id <= 0 {
            tracing::debug!(entity_type, entity_id, "Skipping persist for non-positive entity id");
            return Ok(());
        }

        let mut plan = Vec::new();
        for table in &schema.entity_tables {
            if let Some(row) = self.entity_upsert(&schema, table, entity_id, extension_data)? {
                plan.push(row);
            }
        }
        for table in schema.junction_tables() {
            if let Some(value) = extension_data.get(&table.json_key) {
                plan.extend(self.scoped_upserts(&schema, table, entity_id, value)?);
            }
        }

        tracing::debug!(
            entity_type,
            entity_id,
            statements = plan.len(),
            "Persisting extension data"
        );
        for row in &plan {
            self.repo.upsert(row).await.map_err(|e| {
                tracing::error!(
                    entity_type,
                    entity_id,
                    table = %row.table,
                    "Extension write failed: {e:#}"
                );
                ExtensionError::storage(format!("{e:#}"))
            })?;
        }

        self.registry
            .plugins()
            .persist_data(&PersistRequest {
                entity_type,
                entity_id,
                extension_data,
                entity_data,
            })
            .await;

        Ok(())
    }

    /// Read extension data for one entity in wire form; missing data yields absent keys
    pub async fn load(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<ExtensionData, ExtensionError> {
        let schema = self.registry.get_schema(entity_type);
        if !schema.has_extensions() || entity_id <= 0 {
            return Ok(ExtensionData::new());
        }

        let mut data = ExtensionData::new();
        for table in &schema.entity_tables {
            let columns = table.fields.iter().map(|f| f.column.clone()).collect();
            let rows = self.fetch(&schema, table, entity_id, columns, None).await?;
            if let Some(row) = rows.first() {
                for field in &table.fields {
                    data.insert(field.name.clone(), stored_to_wire(field, row));
                }
            }
        }

        for table in schema.junction_tables() {
            let Some(junction) = &table.junction_field else {
                continue;
            };
            let columns = std::iter::once(junction.column.clone())
                .chain(table.fields.iter().map(|f| f.column.clone()))
                .collect();
            let rows: Vec<ExtensionRow> = self
                .fetch(&schema, table, entity_id, columns, Some(junction.column.clone()))
                .await?
                .iter()
                .map(|stored| {
                    let mut row = ExtensionRow::new();
                    row.insert(
                        junction.name.clone(),
                        stored.get(&junction.column).cloned().unwrap_or(Value::Null),
                    );
                    for field in &table.fields {
                        row.insert(field.name.clone(), stored_to_wire(field, stored));
                    }
                    row
                })
                .collect();

            let pivoted = self.converter.pivot(&rows, table);
            if !pivoted.is_empty() {
                data.insert(table.json_key.clone(), Value::Object(pivoted));
            }
        }

        self.registry
            .plugins()
            .load_data(entity_type, entity_id, data)
            .await
            .map_err(|e| {
                tracing::error!(entity_type, entity_id, "Extension load hook failed: {e:#}");
                ExtensionError::storage(format!("{e:#}"))
            })
    }

    // ===== Helper Methods =====

    async fn fetch(
        &self,
        schema: &EntitySchema,
        table: &TableSpec,
        entity_id: i64,
        columns: Vec<String>,
        order_by: Option<String>,
    ) -> Result<Vec<StoredRow>, ExtensionError> {
        let query = RowQuery {
            table: table.storage_table.clone(),
            id_column: schema.id_column.clone(),
            entity_id,
            columns,
            order_by,
        };
        self.repo.fetch(&query).await.map_err(|e| {
            tracing::error!(
                entity_type = %schema.entity_type,
                entity_id,
                table = %table.storage_table,
                "Extension read failed: {e:#}"
            );
            ExtensionError::storage(format!("{e:#}"))
        })
    }

    /// One full-row upsert, or `None` when no field of the table was supplied
    fn entity_upsert(
        &self,
        schema: &EntitySchema,
        table: &TableSpec,
        entity_id: i64,
        data: &ExtensionData,
    ) -> Result<Option<UpsertRow>, ExtensionError> {
        if !table.fields.iter().any(|f| data.contains_key(&f.name)) {
            return Ok(None);
        }

        let mut values = Vec::with_capacity(table.fields.len());
        for field in &table.fields {
            let value = match data.get(&field.name) {
                Some(value) => self.cast(field, value)?,
                None => default_scalar(field.kind),
            };
            values.push((field.column.clone(), value));
        }

        Ok(Some(UpsertRow {
            table: table.storage_table.clone(),
            key: vec![(schema.id_column.clone(), Scalar::Int(entity_id))],
            update_columns: values.iter().map(|(column, _)| column.clone()).collect(),
            values,
        }))
    }

    /// One partial upsert per row; only supplied fields are updated
    fn scoped_upserts(
        &self,
        schema: &EntitySchema,
        table: &TableSpec,
        entity_id: i64,
        value: &Value,
    ) -> Result<Vec<UpsertRow>, ExtensionError> {
        let (Some(junction), Some(resolver)) = (
            table.junction_field.as_ref(),
            self.converter.resolvers().for_scope(table.scope),
        ) else {
            return Ok(Vec::new());
        };

        let mut upserts = Vec::new();
        for row in self.converter.normalize(value, table)? {
            let raw = row.get(&junction.name).cloned().unwrap_or(Value::Null);
            let Some(junction_id) =
                as_positive_id(&raw).filter(|id| resolver.external_key(*id).is_some())
            else {
                let raw = match raw {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                self.converter.unresolved(table, &raw)?;
                continue;
            };

            let mut values = Vec::with_capacity(table.fields.len());
            let mut update_columns = Vec::new();
            for field in &table.fields {
                let value = match row.get(&field.name) {
                    Some(value) => {
                        update_columns.push(field.column.clone());
                        self.cast(field, value)?
                    }
                    None => default_scalar(field.kind),
                };
                values.push((field.column.clone(), value));
            }
            if update_columns.is_empty() {
                continue;
            }

            upserts.push(UpsertRow {
                table: table.storage_table.clone(),
                key: vec![
                    (schema.id_column.clone(), Scalar::Int(entity_id)),
                    (junction.column.clone(), Scalar::Int(junction_id)),
                ],
                values,
                update_columns,
            });
        }
        Ok(upserts)
    }

    fn cast(&self, field: &FieldSpec, value: &Value) -> Result<Scalar, ExtensionError> {
        match to_storage(field, value) {
            Ok(scalar) => Ok(scalar),
            Err(reason) => match self.converter.policy() {
                JunctionPolicy::Skip => {
                    tracing::warn!(field = %field.name, "{reason}, storing default");
                    Ok(default_scalar(field.kind))
                }
                JunctionPolicy::Reject => Err(ExtensionError::validation(reason)),
            },
        }
    }
}

fn stored_to_wire(field: &FieldSpec, row: &StoredRow) -> Value {
    to_wire(field, row.get(&field.column).unwrap_or(&Value::Null))
}
