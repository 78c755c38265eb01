//! Aggregate populator
//!
//! Two set-based passes recompute the derived counts after all loading:
//!
//! - `products.approval_count`: distinct application numbers per
//!   (ingredient, dosage) over every approval row.
//! - `sales.seller_count`: the same shape, restricted to sales rows whose
//!   ingredient and dosage are both non-null.
//!
//! # Null grouping
//!
//! Groups are matched back onto rows with plain equality, so a row whose
//! ingredient or dosage is null never joins a group and its count stays
//! null. Application numbers that are null are not counted. Every pass first
//! resets the column to null and then recomputes it, so the values always
//! reflect one full pass over the current table contents.

use crate::adapters::database::TableStore;
use crate::domain::{CellValue, FormularyError, Result, RowValues, Table};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One aggregate pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSpec {
    /// Table the pass reads and writes
    pub table: Table,
    /// Derived column receiving the count
    pub target_column: &'static str,
    /// Grouping columns
    pub group_columns: [&'static str; 2],
    /// Column whose distinct non-null values are counted
    pub counted_column: &'static str,
    /// Exclude rows with a null grouping column from the count source
    pub require_non_null_groups: bool,
}

impl AggregateSpec {
    /// Approval count per ingredient/dosage on `products`
    pub const fn approval_count() -> Self {
        Self {
            table: Table::Products,
            target_column: "approval_count",
            group_columns: ["ingredient", "dosage"],
            counted_column: "appl_no",
            require_non_null_groups: false,
        }
    }

    /// Distinct-seller count per ingredient/dosage on `sales`
    pub const fn seller_count() -> Self {
        Self {
            table: Table::Sales,
            target_column: "seller_count",
            group_columns: ["ingredient", "dosage"],
            counted_column: "appl_no",
            require_non_null_groups: true,
        }
    }

    /// Both passes in run order
    pub fn all() -> [Self; 2] {
        [Self::approval_count(), Self::seller_count()]
    }

    fn index_of(&self, column: &str) -> Result<usize> {
        self.table.column_index(column).ok_or_else(|| {
            FormularyError::Aggregate(format!(
                "Column '{}' does not exist on table '{}'",
                column, self.table
            ))
        })
    }
}

/// Result of one aggregate pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateOutcome {
    /// Table the pass updated
    pub table: Table,
    /// Column written
    pub column: &'static str,
    /// Rows carrying a non-null value after the pass
    pub rows_populated: u64,
}

/// Computes the derived value of every row, in row order
///
/// This is the reference semantics for the populator; the in-memory store
/// applies it directly and the PostgreSQL store expresses the same rules in
/// SQL.
///
/// # Errors
///
/// Returns `Aggregate` if a column named by `spec` is not in the table
/// catalogue.
pub fn compute_counts<'a, I>(spec: &AggregateSpec, rows: I) -> Result<Vec<Option<i64>>>
where
    I: IntoIterator<Item = &'a RowValues>,
    I::IntoIter: Clone,
{
    let first = spec.index_of(spec.group_columns[0])?;
    let second = spec.index_of(spec.group_columns[1])?;
    let counted = spec.index_of(spec.counted_column)?;
    let rows = rows.into_iter();

    let mut groups: HashMap<(&CellValue, &CellValue), HashSet<&CellValue>> = HashMap::new();
    for row in rows.clone() {
        let key = (cell(row, first)?, cell(row, second)?);
        if key.0.is_null() || key.1.is_null() {
            // null groups never join back onto a row
            continue;
        }
        let members = groups.entry(key).or_default();
        let value = cell(row, counted)?;
        if !value.is_null() {
            members.insert(value);
        }
    }

    rows.map(|row| {
        let key = (cell(row, first)?, cell(row, second)?);
        Ok(groups.get(&key).map(|members| members.len() as i64))
    })
    .collect()
}

fn cell(row: &RowValues, idx: usize) -> Result<&CellValue> {
    row.get(idx).ok_or_else(|| {
        FormularyError::Aggregate(format!(
            "Row has {} cells, expected at least {}",
            row.len(),
            idx + 1
        ))
    })
}

/// Runs both aggregate passes against a store
///
/// # Errors
///
/// The first failing pass aborts the remaining ones.
pub async fn populate_aggregates(store: &dyn TableStore) -> Result<Vec<AggregateOutcome>> {
    let mut outcomes = Vec::with_capacity(2);
    for spec in AggregateSpec::all() {
        let rows_populated = store.populate_aggregate(&spec).await?;
        tracing::info!(
            table = %spec.table,
            column = spec.target_column,
            rows_populated,
            "Aggregate populated"
        );
        outcomes.push(AggregateOutcome {
            table: spec.table,
            column: spec.target_column,
            rows_populated,
        });
    }
    Ok(outcomes)
}
