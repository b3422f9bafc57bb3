//! Configuration for the entity extensions module

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `ENTITY_EXTENSIONS_JUNCTION_POLICY=reject`
pub const ENV_PREFIX: &str = "ENTITY_EXTENSIONS_";

/// What to do with a locale or scope key that does not resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionPolicy {
    /// Drop the offending row and carry on
    #[default]
    Skip,
    /// Fail the extraction or write with a validation error
    Reject,
}

/// Entity extensions configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Prefix of derived id columns (`id_` + snake_case entity type)
    #[serde(default = "default_id_column_prefix")]
    pub id_column_prefix: String,

    /// Handling of unresolvable junction values and uncastable values
    #[serde(default)]
    pub junction_policy: JunctionPolicy,

    /// Locale code to locale id, backs the static locale resolver
    #[serde(default)]
    pub locales: BTreeMap<String, i64>,

    /// Known shop-like scope ids; empty accepts any positive id
    #[serde(default)]
    pub scope_ids: Vec<i64>,

    /// YAML schema declarations loaded into the declared-schema plugin
    #[serde(default)]
    pub schema_files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id_column_prefix: default_id_column_prefix(),
            junction_policy: JunctionPolicy::default(),
            locales: BTreeMap::new(),
            scope_ids: Vec::new(),
            schema_files: Vec::new(),
        }
    }
}

impl Config {
    /// Load from an optional YAML file, overridden by `ENTITY_EXTENSIONS_*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        Ok(figment.extract()?)
    }
}

fn default_id_column_prefix() -> String {
    "id_".to_string()
}
