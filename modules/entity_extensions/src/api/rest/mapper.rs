//! Conversions between declaration DTOs and contract models

use super::dto::*;
use crate::contract::{FieldKind, FieldSpec, SchemaBuilder, Scope, TableSpec};
use heck::{ToLowerCamelCase, ToSnakeCase};

// ===== Enum conversions =====

impl From<ScopeDto> for Scope {
    fn from(scope: ScopeDto) -> Self {
        match scope {
            ScopeDto::Entity => Scope::Entity,
            ScopeDto::Locale => Scope::Locale,
            ScopeDto::Shop => Scope::Shop,
        }
    }
}

impl From<Scope> for ScopeDto {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Entity => ScopeDto::Entity,
            Scope::Locale => ScopeDto::Locale,
            Scope::Shop => ScopeDto::Shop,
        }
    }
}

impl From<FieldKindDto> for FieldKind {
    fn from(kind: FieldKindDto) -> Self {
        match kind {
            FieldKindDto::String => FieldKind::String,
            FieldKindDto::Integer => FieldKind::Integer,
            FieldKindDto::Boolean => FieldKind::Boolean,
            FieldKindDto::Enum => FieldKind::Enum,
            FieldKindDto::Date => FieldKind::Date,
            FieldKindDto::DateTime => FieldKind::DateTime,
        }
    }
}

impl From<FieldKind> for FieldKindDto {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::String => FieldKindDto::String,
            FieldKind::Integer => FieldKindDto::Integer,
            FieldKind::Boolean => FieldKindDto::Boolean,
            FieldKind::Enum => FieldKindDto::Enum,
            FieldKind::Date => FieldKindDto::Date,
            FieldKind::DateTime => FieldKindDto::DateTime,
        }
    }
}

// ===== Field conversions =====

impl From<FieldDeclarationDto> for FieldSpec {
    fn from(dto: FieldDeclarationDto) -> Self {
        let kind = FieldKind::from(dto.kind);
        let mut field = if kind == FieldKind::Enum && !dto.allowed_values.is_empty() {
            FieldSpec::enumeration(dto.name, dto.allowed_values)
        } else {
            FieldSpec::new(dto.name, kind)
        };
        if let Some(column) = dto.column {
            field = field.with_column(column);
        }
        if dto.nullable {
            field = field.nullable();
        }
        field
    }
}

impl From<FieldSpec> for FieldDeclarationDto {
    fn from(field: FieldSpec) -> Self {
        Self {
            name: field.name,
            kind: field.kind.into(),
            column: Some(field.column),
            nullable: field.nullable,
            allowed_values: field
                .allowed_values
                .map(|v| v.into_iter().collect())
                .unwrap_or_default(),
        }
    }
}

// ===== Table conversions =====

/// Build a table for `entity_type`, filling conventional names where omitted
pub fn table_from_dto(entity_type: &str, dto: TableDeclarationDto) -> TableSpec {
    let scope = Scope::from(dto.scope);
    let mut table = match dto.storage_table {
        Some(storage_table) => {
            let json_key = storage_table.to_lower_camel_case();
            let table = TableSpec::new(storage_table, scope).with_json_key(json_key);
            match scope.default_junction() {
                Some(junction) => table.with_junction(junction),
                None => table,
            }
        }
        None => TableSpec::for_entity(entity_type, scope),
    };

    if let Some(json_key) = dto.json_key {
        table.json_key = json_key;
    }
    if let Some(junction) = dto.junction {
        let column = junction.column.unwrap_or_else(|| junction.name.to_snake_case());
        table.junction_field =
            Some(FieldSpec::new(junction.name, FieldKind::Integer).with_column(column));
    }
    table.fields = dto.fields.into_iter().map(FieldSpec::from).collect();
    table
}

impl From<TableSpec> for TableDeclarationDto {
    fn from(table: TableSpec) -> Self {
        Self {
            scope: table.scope.into(),
            storage_table: Some(table.storage_table),
            json_key: Some(table.json_key),
            junction: table.junction_field.map(|j| JunctionDto {
                name: j.name,
                column: Some(j.column),
            }),
            fields: table.fields.into_iter().map(Into::into).collect(),
        }
    }
}

// ===== Entity conversions =====

/// Fold one entity declaration into a Describe-Schema accumulator
pub fn builder_from_dto(entity_type: &str, dto: EntityDeclarationDto) -> SchemaBuilder {
    let mut builder = SchemaBuilder::new();
    builder.id_column = dto.id_column;
    builder.id_accessors = dto.id_accessors;
    for table in dto.tables {
        builder.add_table(table_from_dto(entity_type, table));
    }
    builder
}

impl From<SchemaBuilder> for EntityDeclarationDto {
    fn from(builder: SchemaBuilder) -> Self {
        Self {
            id_column: builder.id_column,
            id_accessors: builder.id_accessors,
            tables: builder
                .entity_tables
                .into_iter()
                .chain(builder.locale_tables)
                .chain(builder.scope_tables)
                .map(Into::into)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> SchemaFileDto {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_conventional_names_are_filled_in() {
        let file = parse(
            r#"
entities:
  AttributeGroup:
    tables:
      - scope: locale
        fields:
          - name: stringLangField
            kind: string
      - scope: shop
        fields:
          - name: intShopField
            kind: int
"#,
        );
        let declaration = file.entities["AttributeGroup"].clone();
        let builder = builder_from_dto("AttributeGroup", declaration);

        let locale = &builder.locale_tables[0];
        assert_eq!(locale.storage_table, "attribute_group_lang_extra");
        assert_eq!(locale.json_key, "attributeGroupLangExtra");
        assert_eq!(locale.junction_key(), Some("idLang"));
        assert_eq!(locale.fields[0].column, "string_lang_field");

        let shop = &builder.scope_tables[0];
        assert_eq!(shop.json_key, "attributeGroupShopExtra");
        assert_eq!(shop.fields[0].kind, FieldKind::Integer);
    }

    #[test]
    fn test_explicit_names_win() {
        let file = parse(
            r#"
entities:
  Widget:
    id_column: id_product
    tables:
      - scope: shop
        storage_table: product_stock_extra
        json_key: stock
        junction: { name: warehouseId, column: id_warehouse }
        fields:
          - name: status
            kind: enum
            allowed_values: [new, used]
            nullable: true
"#,
        );
        let builder = builder_from_dto("Widget", file.entities["Widget"].clone());
        assert_eq!(builder.id_column.as_deref(), Some("id_product"));

        let table = &builder.scope_tables[0];
        assert_eq!(table.storage_table, "product_stock_extra");
        assert_eq!(table.json_key, "stock");
        let junction = table.junction_field.as_ref().unwrap();
        assert_eq!(
            (junction.name.as_str(), junction.column.as_str()),
            ("warehouseId", "id_warehouse")
        );

        let status = &table.fields[0];
        assert!(status.nullable);
        assert!(status.allows("used"));
        assert!(!status.allows("broken"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<SchemaFileDto, _> =
            serde_yaml::from_str("entities:\n  Widget:\n    tabels: []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_renders_back_to_declaration() {
        let mut builder = SchemaBuilder::new();
        builder.add_table(
            TableSpec::for_entity("Widget", Scope::Entity)
                .with_field(FieldSpec::new("color", FieldKind::String)),
        );
        let dto = EntityDeclarationDto::from(builder.clone());
        assert_eq!(dto.tables[0].storage_table.as_deref(), Some("widget_extra"));

        let reparsed = builder_from_dto("Widget", dto);
        assert_eq!(reparsed, builder);
    }
}
