//! Identifier checks and schema sanitation
//!
//! Identifiers reaching SQL come only from plugin declarations; they are still
//! checked here when a schema is built and again by the query builder.

use crate::contract::{EntitySchema, ExtensionError, Scope, SchemaBuilder, TableSpec};
use std::collections::HashSet;

const MAX_IDENTIFIER_LEN: usize = 64;

/// `^[A-Za-z_][A-Za-z0-9_]{0,63}$`
pub fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    ident.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_identifier(ident: &str) -> Result<(), ExtensionError> {
    if is_valid_identifier(ident) {
        Ok(())
    } else {
        Err(ExtensionError::validation(format!(
            "'{}' is not a valid SQL identifier",
            ident
        )))
    }
}

/// Turn the Describe-Schema accumulator into a cacheable schema.
///
/// Never fails: malformed declarations are dropped with a warning so a broken
/// plugin cannot take the host entity down with it.
pub fn sanitize_schema(
    entity_type: &str,
    builder: SchemaBuilder,
    id_column_prefix: &str,
) -> EntitySchema {
    let mut schema = EntitySchema::empty(entity_type, id_column_prefix);

    if let Some(id_column) = builder.id_column {
        if is_valid_identifier(&id_column) {
            schema.id_accessors = EntitySchema::default_id_accessors(entity_type, &id_column);
            schema.id_column = id_column;
        } else {
            tracing::warn!(
                entity_type,
                id_column = %id_column,
                "Invalid id column declared, falling back to {}",
                schema.id_column
            );
        }
    }
    if !builder.id_accessors.is_empty() {
        schema.id_accessors = builder.id_accessors;
    }

    let mut json_keys = HashSet::new();
    schema.entity_tables = sanitize_tables(
        entity_type,
        &schema.id_column,
        Scope::Entity,
        builder.entity_tables,
        &mut json_keys,
    );
    schema.locale_tables = sanitize_tables(
        entity_type,
        &schema.id_column,
        Scope::Locale,
        builder.locale_tables,
        &mut json_keys,
    );
    schema.scope_tables = sanitize_tables(
        entity_type,
        &schema.id_column,
        Scope::Shop,
        builder.scope_tables,
        &mut json_keys,
    );

    schema
}

fn sanitize_tables(
    entity_type: &str,
    id_column: &str,
    scope: Scope,
    tables: Vec<TableSpec>,
    json_keys: &mut HashSet<String>,
) -> Vec<TableSpec> {
    tables
        .into_iter()
        .filter_map(|mut table| {
            // The list a table was filed under decides its scope
            table.scope = scope;
            sanitize_table(entity_type, id_column, table, json_keys)
        })
        .collect()
}

fn sanitize_table(
    entity_type: &str,
    id_column: &str,
    mut table: TableSpec,
    json_keys: &mut HashSet<String>,
) -> Option<TableSpec> {
    if !is_valid_identifier(&table.storage_table) {
        tracing::warn!(
            entity_type,
            table = %table.storage_table,
            "Dropping table with invalid name"
        );
        return None;
    }

    let mut reserved: HashSet<String> = HashSet::from([id_column.to_string()]);
    match (table.scope, &table.junction_field) {
        (Scope::Entity, Some(_)) => {
            tracing::warn!(
                entity_type,
                table = %table.storage_table,
                "Ignoring junction on entity scope table"
            );
            table.junction_field = None;
        }
        (Scope::Locale | Scope::Shop, None) => {
            tracing::warn!(
                entity_type,
                table = %table.storage_table,
                "Dropping table without junction field"
            );
            return None;
        }
        (Scope::Locale | Scope::Shop, Some(junction)) => {
            if !is_valid_identifier(&junction.column) || junction.column == id_column {
                tracing::warn!(
                    entity_type,
                    table = %table.storage_table,
                    junction = %junction.column,
                    "Dropping table with invalid junction column"
                );
                return None;
            }
            reserved.insert(junction.column.clone());
        }
        (Scope::Entity, None) => {}
    }

    let junction_name = table.junction_key().map(str::to_string);
    let mut names = HashSet::new();
    let mut columns = reserved;
    let fields = std::mem::take(&mut table.fields);
    for field in fields {
        if !is_valid_identifier(&field.column) {
            tracing::warn!(
                entity_type,
                table = %table.storage_table,
                field = %field.name,
                "Dropping field with invalid column"
            );
            // An invalid column means the declaration cannot be trusted at all
            return None;
        }
        if junction_name.as_deref() == Some(field.name.as_str()) {
            tracing::warn!(
                entity_type,
                table = %table.storage_table,
                field = %field.name,
                "Dropping field shadowing the junction key"
            );
            continue;
        }
        if !names.insert(field.name.clone()) || !columns.insert(field.column.clone()) {
            tracing::warn!(
                entity_type,
                table = %table.storage_table,
                field = %field.name,
                "Dropping duplicate field"
            );
            continue;
        }
        table.fields.push(field);
    }

    if table.fields.is_empty() {
        tracing::warn!(entity_type, table = %table.storage_table, "Dropping table without fields");
        return None;
    }
    if table.scope != Scope::Entity && !json_keys.insert(table.json_key.clone()) {
        tracing::warn!(
            entity_type,
            json_key = %table.json_key,
            "Dropping table with duplicate json key"
        );
        return None;
    }
    Some(table)
}
