//! SeaORM repository implementation

use super::mapper::stored_row;
use super::query::{select_statement, upsert_statement};
use crate::domain::repository::{ExtensionRowRepository, RowQuery, StoredRow, UpsertRow};
use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, JsonValue};
use std::sync::Arc;

pub struct SeaOrmExtensionRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmExtensionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExtensionRowRepository for SeaOrmExtensionRepository {
    async fn upsert(&self, row: &UpsertRow) -> Result<()> {
        let stmt = upsert_statement(row)?;
        let backend = self.db.get_database_backend();
        self.db.execute(backend.build(&stmt)).await?;
        Ok(())
    }

    async fn fetch(&self, query: &RowQuery) -> Result<Vec<StoredRow>> {
        let stmt = select_statement(query)?;
        let backend = self.db.get_database_backend();
        let rows = JsonValue::find_by_statement(backend.build(&stmt))
            .all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(stored_row).collect())
    }
}
