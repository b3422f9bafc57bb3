//! Extension table bootstrap
//!
//! Plugins normally own their tables. This creates the missing ones from a
//! schema for fresh installs and tests; existing tables are never altered.

use crate::contract::{EntitySchema, FieldKind, FieldSpec, TableSpec};
use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

/// `CREATE TABLE IF NOT EXISTS` for every table of `schema`
pub async fn ensure_tables(db: &DatabaseConnection, schema: &EntitySchema) -> Result<(), DbErr> {
    let manager = SchemaManager::new(db);
    for table in schema.tables() {
        manager
            .create_table(create_table_statement(&schema.id_column, table))
            .await?;
        tracing::info!(
            entity_type = %schema.entity_type,
            table = %table.storage_table,
            "Ensured extension table"
        );
    }
    Ok(())
}

pub fn create_table_statement(id_column: &str, table: &TableSpec) -> TableCreateStatement {
    let mut create = Table::create();
    create
        .table(Alias::new(table.storage_table.as_str()))
        .if_not_exists()
        .col(ColumnDef::new(Alias::new(id_column)).big_integer().not_null());

    let mut primary_key = Index::create();
    primary_key.col(Alias::new(id_column));
    if let Some(junction) = &table.junction_field {
        create.col(ColumnDef::new(Alias::new(junction.column.as_str())).big_integer().not_null());
        primary_key.col(Alias::new(junction.column.as_str()));
    }

    for field in &table.fields {
        create.col(&mut column_def(field));
    }

    create.primary_key(&mut primary_key).to_owned()
}

fn column_def(field: &FieldSpec) -> ColumnDef {
    let mut column = ColumnDef::new(Alias::new(field.column.as_str()));
    match field.kind {
        FieldKind::Integer => column.big_integer(),
        FieldKind::Boolean => column.boolean(),
        FieldKind::String | FieldKind::Enum | FieldKind::Date | FieldKind::DateTime => {
            column.string()
        }
    };
    // Date kinds default to NULL
    if field.nullable || matches!(field.kind, FieldKind::Date | FieldKind::DateTime) {
        column.null();
    } else {
        column.not_null();
    }
    column
}
