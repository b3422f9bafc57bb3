//! Statement building for extension tables
//!
//! Identifiers come from registered table specs and are re-checked here before
//! being quoted by sea-query; every value is a bound parameter.

use crate::domain::repository::{RowQuery, UpsertRow};
use crate::domain::validation::validate_identifier;
use anyhow::Result;
use sea_orm::sea_query::{
    Alias, Expr, InsertStatement, OnConflict, Order, Query, SelectStatement, SimpleExpr,
};
use sea_orm::Value;

/// `INSERT ... ON CONFLICT (key) DO UPDATE SET ...`, or `DO NOTHING` when no column is updated
pub fn upsert_statement(row: &UpsertRow) -> Result<InsertStatement> {
    validate_identifier(&row.table)?;
    for column in row
        .key
        .iter()
        .chain(row.values.iter())
        .map(|(column, _)| column)
        .chain(row.update_columns.iter())
    {
        validate_identifier(column)?;
    }

    let columns = row.key.iter().chain(row.values.iter());
    let mut stmt = Query::insert();
    stmt.into_table(Alias::new(row.table.as_str()))
        .columns(columns.clone().map(|(column, _)| Alias::new(column.as_str())));
    stmt.values(
        columns
            .map(|(_, scalar)| SimpleExpr::Value(Value::from(scalar.clone())))
            .collect::<Vec<_>>(),
    )
    .map_err(|e| anyhow::anyhow!("Invalid upsert for {}: {e:?}", row.table))?;

    let mut on_conflict =
        OnConflict::columns(row.key.iter().map(|(column, _)| Alias::new(column.as_str())));
    if row.update_columns.is_empty() {
        on_conflict.do_nothing();
    } else {
        on_conflict.update_columns(
            row.update_columns
                .iter()
                .map(|column| Alias::new(column.as_str())),
        );
    }
    stmt.on_conflict(on_conflict);

    Ok(stmt)
}

/// `SELECT columns FROM table WHERE id_column = ?`
pub fn select_statement(query: &RowQuery) -> Result<SelectStatement> {
    validate_identifier(&query.table)?;
    validate_identifier(&query.id_column)?;
    for column in query.columns.iter().chain(query.order_by.iter()) {
        validate_identifier(column)?;
    }

    let mut stmt = Query::select();
    stmt.columns(query.columns.iter().map(|column| Alias::new(column.as_str())))
        .from(Alias::new(query.table.as_str()))
        .and_where(Expr::col(Alias::new(query.id_column.as_str())).eq(query.entity_id));
    if let Some(order_by) = &query.order_by {
        stmt.order_by(Alias::new(order_by.as_str()), Order::Asc);
    }

    Ok(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::FieldKind;
    use crate::domain::casting::Scalar;
    use sea_orm::sea_query::SqliteQueryBuilder;

    fn widget_row() -> UpsertRow {
        UpsertRow {
            table: "widget_lang_extra".to_string(),
            key: vec![
                ("id_widget".to_string(), Scalar::Int(5)),
                ("id_lang".to_string(), Scalar::Int(1)),
            ],
            values: vec![
                ("label".to_string(), Scalar::Text("Rouge".to_string())),
                ("weight".to_string(), Scalar::Int(0)),
            ],
            update_columns: vec!["label".to_string()],
        }
    }

    #[test]
    fn test_upsert_binds_values_and_updates_supplied_columns() {
        let (sql, values) = upsert_statement(&widget_row()).unwrap().build(SqliteQueryBuilder);
        assert!(sql.starts_with(
            r#"INSERT INTO "widget_lang_extra" ("id_widget", "id_lang", "label", "weight")"#
        ));
        assert!(sql.contains("VALUES (?, ?, ?, ?)"));
        assert!(sql.contains(r#"ON CONFLICT ("id_widget", "id_lang") DO UPDATE SET"#));
        assert!(sql.contains(r#""label" = "excluded"."label""#));
        assert!(!sql.contains(r#""weight" = "excluded"."weight""#));
        assert!(!sql.contains("Rouge"));
        assert_eq!(values.0.len(), 4);
    }

    #[test]
    fn test_upsert_without_update_columns_does_nothing_on_conflict() {
        let mut row = widget_row();
        row.update_columns.clear();
        let sql = upsert_statement(&row).unwrap().to_string(SqliteQueryBuilder);
        assert!(sql.contains("DO NOTHING"));
    }

    #[test]
    fn test_invalid_identifiers_are_refused() {
        let mut row = widget_row();
        row.values.push((
            "label\"; DROP TABLE x; --".to_string(),
            Scalar::Null(FieldKind::String),
        ));
        assert!(upsert_statement(&row).is_err());

        let query = RowQuery {
            table: "widget extra".to_string(),
            id_column: "id_widget".to_string(),
            entity_id: 1,
            columns: vec!["label".to_string()],
            order_by: None,
        };
        assert!(select_statement(&query).is_err());
    }

    #[test]
    fn test_select_filters_by_bound_entity_id() {
        let query = RowQuery {
            table: "widget_lang_extra".to_string(),
            id_column: "id_widget".to_string(),
            entity_id: 42,
            columns: vec!["id_lang".to_string(), "label".to_string()],
            order_by: Some("id_lang".to_string()),
        };
        let (sql, values) = select_statement(&query).unwrap().build(SqliteQueryBuilder);
        assert_eq!(
            sql,
            r#"SELECT "id_lang", "label" FROM "widget_lang_extra" WHERE "id_widget" = ? ORDER BY "id_lang" ASC"#
        );
        assert_eq!(values.0, vec![Value::BigInt(Some(42))]);
    }
}
