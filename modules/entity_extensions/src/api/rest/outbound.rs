//! Outbound adapter - runs after native serialization

use crate::contract::{ExtensionError, ExtensionsApi};
use crate::domain::probe_entity_id;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct OutboundAdapter {
    api: Arc<dyn ExtensionsApi>,
}

impl OutboundAdapter {
    pub fn new(api: Arc<dyn ExtensionsApi>) -> Self {
        Self { api }
    }

    /// Merge the entity's extension data into `output`.
    ///
    /// The id is looked up on `source` (the native object) first, then on
    /// `output`. Extension keys overwrite native keys of the same name.
    pub async fn apply(
        &self,
        entity_type: &str,
        source: &Value,
        output: Value,
    ) -> Result<Value, ExtensionError> {
        if !output.is_object() || !self.api.has_extensions(entity_type) {
            return Ok(output);
        }
        let schema = self.api.schema(entity_type);
        let Some(entity_id) =
            probe_entity_id(&schema, source).or_else(|| probe_entity_id(&schema, &output))
        else {
            tracing::debug!(
                entity_type,
                "No entity id in serialized output, skipping extension load"
            );
            return Ok(output);
        };

        let data = self.api.load(entity_type, entity_id).await?;
        let Value::Object(mut merged) = output else {
            return Ok(output);
        };
        merged.extend(data);
        Ok(Value::Object(merged))
    }
}
