//! Deduplicator
//!
//! Removes rows of the approval-derived tables whose full business tuple
//! repeats an earlier row. Columns compare null-safely: two nulls are
//! equal, a null never equals a value. The survivor of each duplicate set
//! is the row with the lowest insertion id. Sales rows are never touched.
//!
//! The tuple includes the derived `approval_count`, so this must run after
//! the aggregate populator.

use crate::adapters::database::TableStore;
use crate::domain::{Result, Table};
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;

/// Duplicate identity of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupePlan {
    /// Table to deduplicate
    pub table: Table,
    /// Columns forming the identity tuple
    pub columns: Vec<&'static str>,
}

impl DedupePlan {
    /// Identity over every business column of `table`
    pub fn for_table(table: Table) -> Self {
        Self {
            table,
            columns: table.business_columns(),
        }
    }

    /// Plans for the three approval-derived tables, in run order
    pub fn approval_tables() -> Vec<Self> {
        Table::APPROVAL_DERIVED
            .iter()
            .copied()
            .filter(Table::is_deduplicated)
            .map(Self::for_table)
            .collect()
    }
}

/// Rows removed from one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupeOutcome {
    pub table: Table,
    pub rows_removed: u64,
}

/// Ids of rows that duplicate a lower-id row
///
/// `rows` pairs each row's insertion id with its canonical identity tuple.
/// Input order does not matter; the lowest id of every identity survives.
pub fn duplicate_ids<K>(rows: impl IntoIterator<Item = (i64, K)>) -> Vec<i64>
where
    K: Hash + Eq,
{
    let mut rows: Vec<(i64, K)> = rows.into_iter().collect();
    rows.sort_by_key(|(id, _)| *id);

    let mut seen: HashSet<K> = HashSet::with_capacity(rows.len());
    let mut duplicates = Vec::new();
    for (id, identity) in rows {
        if !seen.insert(identity) {
            duplicates.push(id);
        }
    }
    duplicates
}

/// Deduplicates every approval-derived table
///
/// # Errors
///
/// The first failing table aborts the remaining ones; tables already
/// deduplicated stay committed.
pub async fn remove_duplicates(store: &dyn TableStore) -> Result<Vec<DedupeOutcome>> {
    let mut outcomes = Vec::new();
    for plan in DedupePlan::approval_tables() {
        let rows_removed = store.remove_duplicates(&plan).await?;
        tracing::info!(table = %plan.table, rows_removed, "Duplicates removed");
        outcomes.push(DedupeOutcome {
            table: plan.table,
            rows_removed,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellValue;

    fn text(value: Option<&str>) -> CellValue {
        CellValue::Text(value.map(str::to_string))
    }

    #[test]
    fn test_keeps_lowest_id() {
        let rows = vec![
            (3, vec![text(Some("A"))]),
            (1, vec![text(Some("A"))]),
            (2, vec![text(Some("B"))]),
        ];
        assert_eq!(duplicate_ids(rows), vec![3]);
    }

    #[test]
    fn test_nulls_compare_equal() {
        let rows = vec![
            (1, vec![text(Some("A")), text(None), CellValue::Integer(Some(3))]),
            (2, vec![text(Some("A")), text(None), CellValue::Integer(Some(3))]),
        ];
        assert_eq!(duplicate_ids(rows), vec![2]);
    }

    #[test]
    fn test_null_vs_value_is_not_a_duplicate() {
        let rows = vec![
            (1, vec![text(Some("A")), text(None)]),
            (2, vec![text(Some("A")), text(Some("X"))]),
        ];
        assert!(duplicate_ids(rows).is_empty());
    }

    #[test]
    fn test_differing_aggregate_blocks_merge() {
        let rows = vec![
            (1, vec![text(Some("A")), CellValue::Integer(Some(2))]),
            (2, vec![text(Some("A")), CellValue::Integer(Some(3))]),
        ];
        assert!(duplicate_ids(rows).is_empty());
    }

    #[test]
    fn test_triplicate_removes_two() {
        let rows = (1..=3).map(|id| (id, "same"));
        assert_eq!(duplicate_ids(rows), vec![2, 3]);
    }

    #[test]
    fn test_plans_skip_sales() {
        let plans = DedupePlan::approval_tables();
        let tables: Vec<Table> = plans.iter().map(|p| p.table).collect();
        assert_eq!(
            tables,
            vec![Table::Products, Table::Exclusivity, Table::Patents]
        );
        assert!(plans[0].columns.contains(&"approval_count"));
    }
}
