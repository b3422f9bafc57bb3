//! Loading of YAML schema declarations into the declared-schema plugin

use super::dto::SchemaFileDto;
use super::mapper::builder_from_dto;
use crate::domain::DeclaredSchemaPlugin;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse one YAML document and add its declarations to `plugin`
pub fn declare_from_yaml(plugin: &mut DeclaredSchemaPlugin, yaml: &str) -> Result<()> {
    let file: SchemaFileDto = serde_yaml::from_str(yaml)?;
    for (entity_type, declaration) in file.entities {
        let builder = builder_from_dto(&entity_type, declaration);
        plugin.declare(entity_type, builder);
    }
    Ok(())
}

/// Build a plugin from schema files, in order
pub fn load_declarations<P: AsRef<Path>>(paths: &[P]) -> Result<DeclaredSchemaPlugin> {
    let mut plugin = DeclaredSchemaPlugin::new();
    for path in paths {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        declare_from_yaml(&mut plugin, &yaml)
            .with_context(|| format!("Invalid schema file {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded extension schema declarations");
    }
    Ok(plugin)
}
