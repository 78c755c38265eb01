//! Final-count verification
//!
//! Read-only: counts the rows of every table and the linked sales rows
//! after the run. Nothing here mutates the store.

pub mod report;

pub use report::FinalCounts;

use crate::adapters::database::TableStore;
use crate::domain::{Result, Table};
use chrono::Utc;

/// Collects the final counts from a store
///
/// # Errors
///
/// Propagates the first failing count query.
pub async fn collect_final_counts(store: &dyn TableStore) -> Result<FinalCounts> {
    let counts = FinalCounts {
        verified_at: Utc::now(),
        products: store.count_rows(Table::Products).await?,
        exclusivity: store.count_rows(Table::Exclusivity).await?,
        patents: store.count_rows(Table::Patents).await?,
        sales: store.count_rows(Table::Sales).await?,
        sales_linked: store.count_linked_sales().await?,
    };

    tracing::info!(
        products = counts.products,
        exclusivity = counts.exclusivity,
        patents = counts.patents,
        sales = counts.sales,
        sales_linked = counts.sales_linked,
        "Final counts"
    );

    Ok(counts)
}
