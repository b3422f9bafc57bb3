//! Repository trait for extension row storage
//!
//! The service hands over fully resolved plans; identifiers in a plan come
//! from registered table and field specs only, values are bound by the
//! implementation. Implementations are in infra/storage/repositories.rs

use super::casting::Scalar;
use anyhow::Result;
use async_trait::async_trait;

/// A stored row keyed by column name
pub type StoredRow = serde_json::Map<String, serde_json::Value>;

/// Insert-or-update of one extension row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRow {
    pub table: String,
    /// Primary key: the id column, plus the junction column for scoped tables
    pub key: Vec<(String, Scalar)>,
    /// Every declared data column with its supplied or default value
    pub values: Vec<(String, Scalar)>,
    /// Columns overwritten when the row already exists
    pub update_columns: Vec<String>,
}

/// Selection of every row owned by one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub table: String,
    pub id_column: String,
    pub entity_id: i64,
    pub columns: Vec<String>,
    /// Ascending sort column, the junction column for scoped tables
    pub order_by: Option<String>,
}

/// Storage for plugin-owned extension tables
#[async_trait]
pub trait ExtensionRowRepository: Send + Sync {
    /// Insert the row, or update `update_columns` when the key exists
    async fn upsert(&self, row: &UpsertRow) -> Result<()>;

    /// Rows matching `id_column = entity_id`, keyed by column
    async fn fetch(&self, query: &RowQuery) -> Result<Vec<StoredRow>>;
}
