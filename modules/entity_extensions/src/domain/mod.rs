//! Domain layer - schema registry, conversion and persistence orchestration

pub mod casting;
pub mod converter;
pub mod declared;
pub mod identity;
pub mod junction;
pub mod registry;
pub mod repository;
pub mod service;
pub mod validation;

pub use converter::Converter;
pub use declared::DeclaredSchemaPlugin;
pub use identity::probe_entity_id;
pub use junction::{JunctionResolver, JunctionResolvers, ScopeIdResolver, StaticLocaleResolver};
pub use registry::{ExtensionRegistry, PluginRegistry};
pub use repository::ExtensionRowRepository;
pub use service::Service;
