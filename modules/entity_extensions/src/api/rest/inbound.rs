//! Inbound adapter - runs before native deserialization

use super::context::stash;
use crate::contract::{ExtensionError, ExtensionsApi};
use axum::http::Extensions;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct InboundAdapter {
    api: Arc<dyn ExtensionsApi>,
}

impl InboundAdapter {
    pub fn new(api: Arc<dyn ExtensionsApi>) -> Self {
        Self { api }
    }

    /// Strip extension fields from `payload` and stash them on the request.
    ///
    /// Returns the payload the native deserializer should see. Non-object
    /// payloads and unextended entity types pass through untouched.
    pub fn apply(
        &self,
        entity_type: &str,
        payload: Value,
        extensions: &mut Extensions,
    ) -> Result<Value, ExtensionError> {
        let Value::Object(payload) = payload else {
            return Ok(payload);
        };
        if !self.api.has_extensions(entity_type) {
            return Ok(Value::Object(payload));
        }

        let extraction = self.api.extract(entity_type, payload)?;
        if !stash(extensions, entity_type, extraction.extension_data) {
            tracing::debug!(entity_type, "Extension data not stashed");
        }
        Ok(Value::Object(extraction.cleaned_payload))
    }
}
