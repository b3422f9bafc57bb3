//! Native client trait for inter-module communication
//!
//! This trait defines the API other modules use to read and write extension
//! data. NO HTTP - direct function calls.

use super::{
    error::ExtensionError,
    model::{EntitySchema, ExtensionData, Extraction},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Entity extensions API for inter-module communication
#[async_trait]
pub trait ExtensionsApi: Send + Sync {
    // ===== Schema =====

    /// Whether any plugin declared extension tables for `entity_type`
    fn has_extensions(&self, entity_type: &str) -> bool;

    /// Cached extension schema for `entity_type`
    fn schema(&self, entity_type: &str) -> Arc<EntitySchema>;

    /// Drop every cached schema
    fn clear_cache(&self);

    // ===== Data =====

    /// Split an inbound payload into extension data and native payload
    fn extract(
        &self,
        entity_type: &str,
        payload: ExtensionData,
    ) -> Result<Extraction, ExtensionError>;

    /// Write extension data for one entity
    async fn persist(
        &self,
        entity_type: &str,
        entity_id: i64,
        extension_data: &ExtensionData,
        entity_data: &ExtensionData,
    ) -> Result<(), ExtensionError>;

    /// Read extension data for one entity in wire form
    async fn load(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<ExtensionData, ExtensionError>;
}
