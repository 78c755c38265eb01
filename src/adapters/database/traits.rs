//! Store abstraction traits
//!
//! This module defines the trait that relational store adapters must
//! implement to receive the pipeline's output.

use crate::core::aggregate::AggregateSpec;
use crate::core::dedupe::DedupePlan;
use crate::domain::{Result, RowValues, Table};
use async_trait::async_trait;

/// Relational store for the four persisted tables
///
/// Each mutating call is one atomic unit: either everything it does is
/// committed, or nothing is.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Create the tables if they do not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert one batch of rows in a single transaction
    ///
    /// # Arguments
    ///
    /// * `table` - Target table
    /// * `rows` - Rows ordered as `table.columns()`
    ///
    /// # Returns
    ///
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is rejected; nothing of the batch is
    /// kept in that case.
    async fn insert_batch(&self, table: Table, rows: Vec<RowValues>) -> Result<u64>;

    /// Reset and recompute one derived aggregate column
    ///
    /// # Returns
    ///
    /// Returns the number of rows carrying a non-null value afterwards.
    async fn populate_aggregate(&self, spec: &AggregateSpec) -> Result<u64>;

    /// Delete every row that duplicates a lower-id row under `plan`
    ///
    /// # Returns
    ///
    /// Returns the number of rows removed.
    async fn remove_duplicates(&self, plan: &DedupePlan) -> Result<u64>;

    /// Count rows of a table
    async fn count_rows(&self, table: Table) -> Result<u64>;

    /// Count sales rows with a non-null linking identifier
    async fn count_linked_sales(&self) -> Result<u64>;

    /// Backend name for logs and summaries
    fn backend_name(&self) -> &str;
}
