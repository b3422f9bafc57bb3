//! Native client implementation - wraps the domain service for in-process calls

use crate::contract::{EntitySchema, ExtensionData, ExtensionError, ExtensionsApi, Extraction};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client that calls the domain service directly
///
/// Host modules hold it as `Arc<dyn ExtensionsApi>`; the request-boundary
/// adapters are built on top of it.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ExtensionsApi for NativeClient {
    fn has_extensions(&self, entity_type: &str) -> bool {
        self.service.has_extensions(entity_type)
    }

    fn schema(&self, entity_type: &str) -> Arc<EntitySchema> {
        self.service.schema(entity_type)
    }

    fn clear_cache(&self) {
        self.service.clear_cache();
    }

    fn extract(
        &self,
        entity_type: &str,
        payload: ExtensionData,
    ) -> Result<Extraction, ExtensionError> {
        self.service.extract(entity_type, payload)
    }

    async fn persist(
        &self,
        entity_type: &str,
        entity_id: i64,
        extension_data: &ExtensionData,
        entity_data: &ExtensionData,
    ) -> Result<(), ExtensionError> {
        self.service
            .persist(entity_type, entity_id, extension_data, entity_data)
            .await
    }

    async fn load(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<ExtensionData, ExtensionError> {
        self.service.load(entity_type, entity_id).await
    }
}
