//! Entity Extensions Module
//!
//! Lets installed plugins attach extra fields to core business entities.
//! Plugins declare extension tables per entity type; the engine strips those
//! fields from inbound payloads, writes them to the plugin-owned tables after
//! the native write, and merges them back into outbound payloads.
//!
//! Locale and shop scoped values are pivoted on the wire
//! (`{"label": {"fr-FR": "Rouge"}}`) and stored one row per junction id.

// Public exports
pub mod contract;
pub use contract::{
    client::ExtensionsApi, error::ExtensionError, EntitySchema, ExtensionData, ExtensionPlugin,
    ExtensionRow, Extraction, FieldKind, FieldSpec, PersistRequest, SchemaBuilder, Scope, TableSpec,
};

pub mod config;
pub use config::{Config, JunctionPolicy};

pub mod module;
pub use module::EntityExtensionsModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
