//! Contract models for entity extensions
//!
//! These models are transport-agnostic and describe the extension fields that
//! plugins attach to core entities.
//! NO serde derives - declarations read from YAML go through `api::rest::dto`.

use heck::{ToLowerCamelCase, ToSnakeCase};
use std::collections::BTreeSet;

/// Extension values as exchanged on the wire, keyed by field name (entity
/// scope) or by table json key (locale and shop scopes)
pub type ExtensionData = serde_json::Map<String, serde_json::Value>;

/// One row in row form: the junction key plus data fields, keyed by field name
pub type ExtensionRow = serde_json::Map<String, serde_json::Value>;

/// Scalar kind of an extension field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    Enum,
    Date,
    DateTime,
}

/// Storage shape of an extension table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One row per owning entity
    Entity,
    /// One row per entity and locale
    Locale,
    /// One row per entity and shop-like scope id
    Shop,
}

impl Scope {
    /// Conventional storage table suffix for this scope
    pub fn table_suffix(self) -> &'static str {
        match self {
            Self::Entity => "_extra",
            Self::Locale => "_lang_extra",
            Self::Shop => "_shop_extra",
        }
    }

    /// Conventional junction field for this scope, `None` for entity scope
    pub fn default_junction(self) -> Option<FieldSpec> {
        match self {
            Self::Entity => None,
            Self::Locale => {
                Some(FieldSpec::new("idLang", FieldKind::Integer).with_column("id_lang"))
            }
            Self::Shop => Some(FieldSpec::new("idShop", FieldKind::Integer).with_column("id_shop")),
        }
    }
}

/// One declared extension field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name, unique within the owning table
    pub name: String,
    /// Scalar kind driving casts and defaults
    pub kind: FieldKind,
    /// Storage column
    pub column: String,
    /// Whether an explicit `null` is stored as NULL
    pub nullable: bool,
    /// Enumeration constraint, only meaningful for `FieldKind::Enum`
    pub allowed_values: Option<BTreeSet<String>>,
}

impl FieldSpec {
    /// Create a non-nullable field whose column is the snake-cased name
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            column: name.to_snake_case(),
            name,
            kind,
            nullable: false,
            allowed_values: None,
        }
    }

    /// Shorthand for an enum field restricted to `values`
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::new(name, FieldKind::Enum)
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Whether `value` satisfies the enumeration constraint
    pub fn allows(&self, value: &str) -> bool {
        self.allowed_values
            .as_ref()
            .map_or(true, |allowed| allowed.contains(value))
    }
}

/// One extension storage table and its fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub storage_table: String,
    /// Key under which locale/shop data appears on the wire
    pub json_key: String,
    pub scope: Scope,
    /// Column joining a row to a locale or scope id; mandatory outside entity scope
    pub junction_field: Option<FieldSpec>,
    pub fields: Vec<FieldSpec>,
}

impl TableSpec {
    /// Create an empty table; `json_key` defaults to the storage table name
    pub fn new(storage_table: impl Into<String>, scope: Scope) -> Self {
        let storage_table = storage_table.into();
        Self {
            json_key: storage_table.clone(),
            storage_table,
            scope,
            junction_field: None,
            fields: Vec::new(),
        }
    }

    /// Create a table with conventional names for `entity_type`:
    /// `attribute_group_lang_extra` stored, `attributeGroupLangExtra` on the wire,
    /// and the scope's default junction field
    pub fn for_entity(entity_type: &str, scope: Scope) -> Self {
        let storage_table = format!("{}{}", entity_type.to_snake_case(), scope.table_suffix());
        Self {
            json_key: storage_table.to_lower_camel_case(),
            junction_field: scope.default_junction(),
            ..Self::new(storage_table, scope)
        }
    }

    pub fn with_json_key(mut self, json_key: impl Into<String>) -> Self {
        self.json_key = json_key.into();
        self
    }

    pub fn with_junction(mut self, junction: FieldSpec) -> Self {
        self.junction_field = Some(junction);
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a declared field by wire name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Wire name of the junction key, if any
    pub fn junction_key(&self) -> Option<&str> {
        self.junction_field.as_ref().map(|j| j.name.as_str())
    }
}

/// Full extension schema of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub entity_type: String,
    /// Column holding the owning entity id in every extension table
    pub id_column: String,
    pub entity_tables: Vec<TableSpec>,
    pub locale_tables: Vec<TableSpec>,
    pub scope_tables: Vec<TableSpec>,
    /// Ordered property names probed to find the entity id in native objects
    pub id_accessors: Vec<String>,
}

impl EntitySchema {
    /// Schema without any table, as produced when no plugin responds
    pub fn empty(entity_type: impl Into<String>, id_column_prefix: &str) -> Self {
        let entity_type = entity_type.into();
        let id_column = Self::default_id_column(&entity_type, id_column_prefix);
        Self {
            id_accessors: Self::default_id_accessors(&entity_type, &id_column),
            entity_type,
            id_column,
            entity_tables: Vec::new(),
            locale_tables: Vec::new(),
            scope_tables: Vec::new(),
        }
    }

    /// `AttributeGroup` with prefix `id_` becomes `id_attribute_group`
    pub fn default_id_column(entity_type: &str, prefix: &str) -> String {
        format!("{}{}", prefix, entity_type.to_snake_case())
    }

    /// Candidate id properties derived from the id column, most specific first
    pub fn default_id_accessors(entity_type: &str, id_column: &str) -> Vec<String> {
        let mut accessors = vec![
            id_column.to_lower_camel_case(),
            id_column.to_string(),
            format!("{}Id", entity_type.to_lower_camel_case()),
            "id".to_string(),
        ];
        let mut seen = BTreeSet::new();
        accessors.retain(|a| seen.insert(a.clone()));
        accessors
    }

    pub fn has_extensions(&self) -> bool {
        !(self.entity_tables.is_empty()
            && self.locale_tables.is_empty()
            && self.scope_tables.is_empty())
    }

    /// All tables in entity, locale, shop order
    pub fn tables(&self) -> impl Iterator<Item = &TableSpec> {
        self.entity_tables
            .iter()
            .chain(self.locale_tables.iter())
            .chain(self.scope_tables.iter())
    }

    /// Locale and shop tables, the ones stored in row form
    pub fn junction_tables(&self) -> impl Iterator<Item = &TableSpec> {
        self.locale_tables.iter().chain(self.scope_tables.iter())
    }
}

/// Result of stripping extension fields out of an inbound payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extension values; locale/shop tables already in row form
    pub extension_data: ExtensionData,
    /// Payload left for native processing
    pub cleaned_payload: ExtensionData,
}
