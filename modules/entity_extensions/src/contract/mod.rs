//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models, the plugin contract and the
//! native client trait.

pub mod client;
pub mod error;
pub mod model;
pub mod plugin;

pub use client::ExtensionsApi;
pub use error::ExtensionError;
pub use model::{
    EntitySchema, ExtensionData, ExtensionRow, Extraction, FieldKind, FieldSpec, Scope, TableSpec,
};
pub use plugin::{ExtensionPlugin, PersistRequest, SchemaBuilder};
