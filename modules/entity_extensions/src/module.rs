//! Module bootstrap and lifecycle

use crate::api::native::NativeClient;
use crate::api::rest::declarations::load_declarations;
use crate::api::rest::Adapters;
use crate::config::Config;
use crate::contract::{ExtensionError, ExtensionPlugin, ExtensionsApi};
use crate::domain::{
    Converter, ExtensionRegistry, ExtensionRowRepository, JunctionResolvers, PluginRegistry,
    Service,
};
use crate::infra::storage::{ensure_tables, SeaOrmExtensionRepository};
use anyhow::Result;
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Entity extensions module
///
/// Plugins and resolvers are registered before `init`; the schema cache is
/// built from whatever was registered at that point.
pub struct EntityExtensionsModule {
    config: RwLock<Config>,
    plugins: RwLock<PluginRegistry>,
    resolvers: RwLock<Option<JunctionResolvers>>,
    service: RwLock<Option<Arc<Service>>>,
}

impl Default for EntityExtensionsModule {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl EntityExtensionsModule {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            plugins: RwLock::new(PluginRegistry::new()),
            resolvers: RwLock::new(None),
            service: RwLock::new(None),
        }
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn register_plugin(&self, plugin: Arc<dyn ExtensionPlugin>) -> &Self {
        self.plugins.write().register(plugin);
        self
    }

    /// Replace the config-backed locale and scope resolvers
    pub fn set_resolvers(&self, resolvers: JunctionResolvers) -> &Self {
        *self.resolvers.write() = Some(resolvers);
        self
    }

    /// Wire the module against a SeaORM connection
    pub fn init(&self, db: Arc<DatabaseConnection>) -> Result<()> {
        self.init_with_repository(Arc::new(SeaOrmExtensionRepository::new(db)))
    }

    /// Wire the module against any row repository
    pub fn init_with_repository(&self, repo: Arc<dyn ExtensionRowRepository>) -> Result<()> {
        let config = self.config();

        // Declared schemas go first so code plugins can extend or replace them
        let mut plugins = PluginRegistry::new();
        if !config.schema_files.is_empty() {
            let declared = load_declarations(&config.schema_files)?;
            plugins.register(Arc::new(declared));
        }
        for plugin in self.plugins.read().iter() {
            plugins.register(plugin.clone());
        }

        let resolvers = self
            .resolvers
            .read()
            .clone()
            .unwrap_or_else(|| JunctionResolvers::from_config(&config));
        let converter = Converter::new(resolvers, config.junction_policy);
        let registry = Arc::new(ExtensionRegistry::new(
            Arc::new(plugins),
            config.id_column_prefix.clone(),
        ));

        let plugin_count = registry.plugins().len();
        let service = Arc::new(Service::new(registry, converter, repo));
        *self.service.write() = Some(service);

        tracing::info!(
            plugins = plugin_count,
            junction_policy = ?config.junction_policy,
            "Entity extensions initialized"
        );
        Ok(())
    }

    pub fn service(&self) -> Result<Arc<Service>, ExtensionError> {
        self.service.read().clone().ok_or(ExtensionError::Internal)
    }

    /// In-process client for host modules
    pub fn client(&self) -> Result<Arc<dyn ExtensionsApi>, ExtensionError> {
        Ok(Arc::new(NativeClient::new(self.service()?)))
    }

    pub fn adapters(&self) -> Result<Adapters, ExtensionError> {
        Ok(Adapters::new(self.client()?))
    }

    /// Create missing extension tables for `entity_types`
    pub async fn migrate(&self, db: &DatabaseConnection, entity_types: &[&str]) -> Result<()> {
        let service = self.service()?;
        for entity_type in entity_types {
            let schema = service.schema(entity_type);
            ensure_tables(db, &schema).await?;
        }
        tracing::info!(entity_types = entity_types.len(), "Entity extension tables ensured");
        Ok(())
    }
}
