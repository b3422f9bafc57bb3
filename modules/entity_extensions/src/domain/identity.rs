//! Entity id probing on native objects

use super::casting::as_positive_id;
use crate::contract::EntitySchema;
use serde_json::Value;

/// Find the entity id in `object` by trying the schema's id accessors in order.
///
/// Accessors that are missing, null or not a positive id are skipped, so a
/// generic `id` still resolves behind an unset specific accessor.
pub fn probe_entity_id(schema: &EntitySchema, object: &Value) -> Option<i64> {
    let object = object.as_object()?;
    schema.id_accessors.iter().find_map(|accessor| {
        let value = object.get(accessor)?;
        let id = as_positive_id(value);
        if id.is_none() && !value.is_null() {
            tracing::debug!(
                entity_type = %schema.entity_type,
                accessor = %accessor,
                "Entity id accessor present but not a positive id"
            );
        }
        id
    })
}
