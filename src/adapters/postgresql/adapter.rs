//! PostgreSQL adapter implementing the store trait
//!
//! Every mutating call runs in its own transaction; a failure rolls that
//! transaction back when it is dropped and leaves earlier commits intact.

use crate::adapters::database::traits::TableStore;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::sql;
use crate::core::aggregate::AggregateSpec;
use crate::core::dedupe::DedupePlan;
use crate::domain::{FormularyError, Result, RowValues, Table};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Bundled schema
const SCHEMA_SQL: &str = include_str!("../../../migrations/001_initial_schema.sql");

/// PostgreSQL implementation of [`TableStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    async fn count(&self, query: &str) -> Result<u64> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_one(query, &[])
            .await
            .map_err(|e| FormularyError::Database(format!("Count query failed: {}", e)))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| FormularyError::Database(format!("Unexpected count result: {}", e)))?;
        Ok(count.max(0) as u64)
    }
}

fn check_row_width(table: Table, rows: &[RowValues]) -> Result<()> {
    let width = table.columns().len();
    match rows.iter().position(|row| row.len() != width) {
        Some(idx) => Err(FormularyError::Validation(format!(
            "Row {} of batch for '{}' has {} cells, expected {}",
            idx,
            table,
            rows[idx].len(),
            width
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl TableStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.client.get_connection().await?;
        conn.batch_execute(SCHEMA_SQL)
            .await
            .map_err(|e| FormularyError::Database(format!("Failed to execute migration: {}", e)))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    async fn insert_batch(&self, table: Table, rows: Vec<RowValues>) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        check_row_width(table, &rows)?;

        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(|e| {
            FormularyError::Database(format!("Failed to start transaction: {}", e))
        })?;

        let mut inserted = 0;
        for chunk in rows.chunks(sql::rows_per_statement(table)) {
            let statement = sql::insert_statement(table, chunk.len());
            let params: Vec<&(dyn ToSql + Sync)> = chunk
                .iter()
                .flat_map(|row| row.iter().map(sql::cell_param))
                .collect();
            inserted += tx
                .execute(statement.as_str(), &params)
                .await
                .map_err(|e| FormularyError::Database(format!("Insert into '{}' failed: {}", table, e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| FormularyError::Database(format!("Commit failed: {}", e)))?;

        Ok(inserted)
    }

    async fn populate_aggregate(&self, spec: &AggregateSpec) -> Result<u64> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(|e| {
            FormularyError::Aggregate(format!("Failed to start transaction: {}", e))
        })?;

        tx.execute(sql::reset_aggregate(spec).as_str(), &[])
            .await
            .map_err(|e| {
                FormularyError::Aggregate(format!("Failed to reset {}: {}", spec.target_column, e))
            })?;

        let updated = tx
            .execute(sql::populate_aggregate(spec).as_str(), &[])
            .await
            .map_err(|e| {
                FormularyError::Aggregate(format!(
                    "Failed to populate {}: {}",
                    spec.target_column, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| FormularyError::Aggregate(format!("Commit failed: {}", e)))?;

        tracing::debug!(table = %spec.table, column = spec.target_column, updated, "Aggregate pass committed");
        self.count(&sql::count_populated(spec)).await
    }

    async fn remove_duplicates(&self, plan: &DedupePlan) -> Result<u64> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(|e| {
            FormularyError::Dedupe(format!("Failed to start transaction: {}", e))
        })?;

        let removed = tx
            .execute(sql::remove_duplicates(plan).as_str(), &[])
            .await
            .map_err(|e| {
                FormularyError::Dedupe(format!("Dedupe of '{}' failed: {}", plan.table, e))
            })?;

        tx.commit()
            .await
            .map_err(|e| FormularyError::Dedupe(format!("Commit failed: {}", e)))?;

        Ok(removed)
    }

    async fn count_rows(&self, table: Table) -> Result<u64> {
        self.count(&sql::count_rows(table)).await
    }

    async fn count_linked_sales(&self) -> Result<u64> {
        self.count(&sql::count_linked_sales()).await
    }

    fn backend_name(&self) -> &str {
        "postgresql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, ExclusivityRecord, TableRecord};

    #[test]
    fn test_schema_covers_catalogue() {
        for table in Table::ALL {
            let create = format!("CREATE TABLE IF NOT EXISTS {} (", table.name());
            assert!(SCHEMA_SQL.contains(&create), "missing table {table}");
            for column in table.business_columns() {
                assert!(SCHEMA_SQL.contains(column), "missing column {column}");
            }
        }
    }

    #[test]
    fn test_row_width_check() {
        let good = vec![ExclusivityRecord::default().into_values()];
        assert!(check_row_width(Table::Exclusivity, &good).is_ok());

        let bad = vec![vec![CellValue::Text(None)]];
        let err = check_row_width(Table::Exclusivity, &bad).unwrap_err();
        assert!(matches!(err, FormularyError::Validation(_)));
    }
}
