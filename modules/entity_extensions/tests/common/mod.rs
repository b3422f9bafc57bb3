//! Common test utilities: in-memory storage, fixture plugins and service wiring

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use entity_extensions::config::{Config, JunctionPolicy};
use entity_extensions::contract::*;
use entity_extensions::domain::repository::{ExtensionRowRepository, RowQuery, StoredRow, UpsertRow};
use entity_extensions::domain::{
    Converter, ExtensionRegistry, JunctionResolvers, PluginRegistry, Service,
};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn print_json(label: &str, value: &Value) {
    println!("   {}: {}", label, serde_json::to_string_pretty(value).unwrap());
}

/// `json!` object literal as extension data
pub fn data(value: Value) -> ExtensionData {
    value.as_object().cloned().unwrap()
}

// ===== Repositories =====

/// Upsert-semantics table store keyed by storage table
#[derive(Clone, Default)]
pub struct MemoryRowRepo {
    tables: Arc<RwLock<HashMap<String, Vec<StoredRow>>>>,
    upserts: Arc<AtomicUsize>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryRowRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &str) -> Vec<StoredRow> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn is_untouched(&self) -> bool {
        self.upsert_count() == 0 && self.fetch_count() == 0
    }

    /// Print verbose information about stored rows
    pub fn print_state(&self, context: &str) {
        let tables = self.tables.read();
        println!("\n========== Extension Tables: {} ==========", context);
        let sorted: BTreeMap<_, _> = tables.iter().collect();
        for (table, rows) in sorted {
            println!("  {} ({} rows)", table, rows.len());
            for row in rows {
                println!("    {}", Value::Object(row.clone()));
            }
        }
        println!("==========================================\n");
    }
}

#[async_trait]
impl ExtensionRowRepository for MemoryRowRepo {
    async fn upsert(&self, row: &UpsertRow) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let key: Vec<(String, Value)> = row
            .key
            .iter()
            .map(|(column, scalar)| (column.clone(), Value::from(scalar.clone())))
            .collect();

        let mut tables = self.tables.write();
        let rows = tables.entry(row.table.clone()).or_default();
        let existing = rows
            .iter_mut()
            .find(|stored| key.iter().all(|(column, value)| stored.get(column) == Some(value)));

        match existing {
            Some(stored) => {
                for (column, scalar) in &row.values {
                    if row.update_columns.contains(column) {
                        stored.insert(column.clone(), Value::from(scalar.clone()));
                    }
                }
            }
            None => {
                let mut stored = StoredRow::new();
                for (column, value) in key {
                    stored.insert(column, value);
                }
                for (column, scalar) in &row.values {
                    stored.insert(column.clone(), Value::from(scalar.clone()));
                }
                rows.push(stored);
            }
        }
        Ok(())
    }

    async fn fetch(&self, query: &RowQuery) -> Result<Vec<StoredRow>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read();
        let mut rows: Vec<StoredRow> = tables
            .get(&query.table)
            .into_iter()
            .flatten()
            .filter(|row| row.get(&query.id_column) == Some(&Value::from(query.entity_id)))
            .map(|row| {
                query
                    .columns
                    .iter()
                    .map(|column| (column.clone(), row.get(column).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect();
        if let Some(order_by) = &query.order_by {
            rows.sort_by_key(|row| row.get(order_by).and_then(Value::as_i64));
        }
        Ok(rows)
    }
}

/// Every call fails, as a lost database connection would
pub struct FailingRowRepo;

#[async_trait]
impl ExtensionRowRepository for FailingRowRepo {
    async fn upsert(&self, _row: &UpsertRow) -> Result<()> {
        bail!("connection refused")
    }

    async fn fetch(&self, _query: &RowQuery) -> Result<Vec<StoredRow>> {
        bail!("connection refused")
    }
}

// ===== Plugins =====

/// Widget with one table per scope
pub struct WidgetPlugin;

impl WidgetPlugin {
    pub fn tables() -> Vec<TableSpec> {
        vec![
            TableSpec::for_entity("Widget", Scope::Entity)
                .with_field(FieldSpec::new("color", FieldKind::String))
                .with_field(FieldSpec::new("weight", FieldKind::Integer))
                .with_field(FieldSpec::new("inStock", FieldKind::Boolean))
                .with_field(FieldSpec::new("releasedOn", FieldKind::Date)),
            TableSpec::for_entity("Widget", Scope::Locale)
                .with_field(FieldSpec::new("label", FieldKind::String))
                .with_field(FieldSpec::new("tagline", FieldKind::String)),
            TableSpec::for_entity("Widget", Scope::Shop)
                .with_field(FieldSpec::new("stock", FieldKind::Integer))
                .with_field(FieldSpec::enumeration("condition", ["new", "used"])),
        ]
    }
}

impl ExtensionPlugin for WidgetPlugin {
    fn name(&self) -> &str {
        "widget"
    }

    fn on_describe_schema(
        &self,
        entity_type: &str,
        schema: &mut SchemaBuilder,
    ) -> Option<SchemaBuilder> {
        if entity_type == "Widget" {
            for table in Self::tables() {
                schema.add_table(table);
            }
        }
        None
    }
}

/// Records broadcasts and optionally rewrites loaded data
#[derive(Default)]
pub struct RecordingPlugin {
    pub persisted: RwLock<Vec<(String, i64, ExtensionData, ExtensionData)>>,
    pub loaded: AtomicUsize,
    pub badge: Option<&'static str>,
    pub fail_persist: bool,
    pub fail_load: bool,
}

#[async_trait]
impl ExtensionPlugin for RecordingPlugin {
    fn name(&self) -> &str {
        "recording"
    }

    async fn on_load_data(
        &self,
        _entity_type: &str,
        _entity_id: i64,
        data: &mut ExtensionData,
    ) -> Result<Option<ExtensionData>> {
        self.loaded.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            bail!("load hook exploded");
        }
        if let Some(badge) = self.badge {
            data.insert("badge".to_string(), Value::from(badge));
        }
        Ok(None)
    }

    async fn on_persist_data(&self, request: &PersistRequest<'_>) -> Result<()> {
        self.persisted.write().push((
            request.entity_type.to_string(),
            request.entity_id,
            request.extension_data.clone(),
            request.entity_data.clone(),
        ));
        if self.fail_persist {
            bail!("persist hook exploded");
        }
        Ok(())
    }
}

// ===== Wiring =====

pub fn test_config(policy: JunctionPolicy) -> Config {
    Config {
        junction_policy: policy,
        locales: BTreeMap::from([("fr-FR".to_string(), 1), ("en-GB".to_string(), 2)]),
        scope_ids: vec![1, 2],
        ..Config::default()
    }
}

pub fn build_service(
    plugins: Vec<Arc<dyn ExtensionPlugin>>,
    repo: Arc<dyn ExtensionRowRepository>,
    policy: JunctionPolicy,
) -> Arc<Service> {
    let config = test_config(policy);
    let mut registry = PluginRegistry::new();
    for plugin in plugins {
        registry.register(plugin);
    }
    let registry = Arc::new(ExtensionRegistry::new(
        Arc::new(registry),
        config.id_column_prefix.clone(),
    ));
    let converter = Converter::new(JunctionResolvers::from_config(&config), config.junction_policy);
    Arc::new(Service::new(registry, converter, repo))
}

pub fn widget_service(repo: &MemoryRowRepo) -> Arc<Service> {
    build_service(
        vec![Arc::new(WidgetPlugin) as Arc<dyn ExtensionPlugin>],
        Arc::new(repo.clone()),
        JunctionPolicy::Skip,
    )
}
