//! Request-scoped stash for extension data between inbound and post-write

use crate::contract::ExtensionData;
use axum::http::Extensions;

/// Extension data stripped from the current request's payload
#[derive(Debug, Clone, PartialEq)]
pub struct StashedExtensionData {
    pub entity_type: String,
    pub data: ExtensionData,
}

/// Store `data` for `entity_type` unless empty or a stash already exists.
///
/// Returns whether the slot was written.
pub fn stash(extensions: &mut Extensions, entity_type: &str, data: ExtensionData) -> bool {
    if data.is_empty() || extensions.get::<StashedExtensionData>().is_some() {
        return false;
    }
    extensions.insert(StashedExtensionData {
        entity_type: entity_type.to_string(),
        data,
    });
    true
}

/// Stashed data, if it was stored for `entity_type`
pub fn stashed<'a>(extensions: &'a Extensions, entity_type: &str) -> Option<&'a ExtensionData> {
    extensions
        .get::<StashedExtensionData>()
        .filter(|stash| stash.entity_type == entity_type)
        .map(|stash| &stash.data)
}
