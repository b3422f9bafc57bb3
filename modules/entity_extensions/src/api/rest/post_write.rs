//! Post-write adapter - runs after the native create or update

use super::context::stashed;
use crate::contract::{ExtensionData, ExtensionError, ExtensionsApi};
use crate::domain::probe_entity_id;
use axum::http::Extensions;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct PostWriteAdapter {
    api: Arc<dyn ExtensionsApi>,
}

impl PostWriteAdapter {
    pub fn new(api: Arc<dyn ExtensionsApi>) -> Self {
        Self { api }
    }

    /// Persist the stashed extension data against the entity in `result`.
    ///
    /// Nothing happens when nothing was stashed or the entity id cannot be
    /// found in `result`.
    pub async fn apply(
        &self,
        entity_type: &str,
        result: &Value,
        extensions: &Extensions,
    ) -> Result<(), ExtensionError> {
        let Some(data) = stashed(extensions, entity_type) else {
            return Ok(());
        };
        let schema = self.api.schema(entity_type);
        let Some(entity_id) = probe_entity_id(&schema, result) else {
            tracing::debug!(
                entity_type,
                "No entity id in write result, skipping extension persist"
            );
            return Ok(());
        };

        let entity_data = result.as_object().cloned().unwrap_or_else(ExtensionData::new);
        self.api.persist(entity_type, entity_id, data, &entity_data).await
    }
}
