//! Serde DTOs for declarative extension schemas
//!
//! ```yaml
//! entities:
//!   Widget:
//!     tables:
//!       - scope: locale
//!         fields:
//!           - name: label
//!             kind: string
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One schema file: extension declarations per entity type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFileDto {
    #[serde(default)]
    pub entities: BTreeMap<String, EntityDeclarationDto>,
}

/// Extension declaration of one entity type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDeclarationDto {
    /// Overrides the derived `id_<entity>` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,

    /// Overrides the derived id accessors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub id_accessors: Vec<String>,

    #[serde(default)]
    pub tables: Vec<TableDeclarationDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDeclarationDto {
    pub scope: ScopeDto,

    /// Defaults to `<entity>_extra`, `<entity>_lang_extra` or `<entity>_shop_extra`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_table: Option<String>,

    /// Defaults to the lowerCamel storage table name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_key: Option<String>,

    /// Defaults to `idLang`/`id_lang` or `idShop`/`id_shop`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<JunctionDto>,

    pub fields: Vec<FieldDeclarationDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JunctionDto {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDeclarationDto {
    pub name: String,

    pub kind: FieldKindDto,

    /// Defaults to the snake_case field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    #[serde(default)]
    pub nullable: bool,

    /// Only read for `kind: enum`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeDto {
    Entity,
    #[serde(alias = "lang")]
    Locale,
    #[serde(alias = "scope")]
    Shop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKindDto {
    String,
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "bool")]
    Boolean,
    Enum,
    Date,
    #[serde(alias = "date_time")]
    DateTime,
}
