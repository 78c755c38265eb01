//! In-memory store
//!
//! Backs dry runs and tests. Rows receive increasing insertion ids exactly
//! like a `BIGSERIAL` column, every committed batch size is recorded, and
//! the aggregate and dedupe passes apply the reference semantics from
//! [`crate::core::aggregate`] and [`crate::core::dedupe`].

use crate::adapters::database::traits::TableStore;
use crate::core::aggregate::{compute_counts, AggregateSpec};
use crate::core::dedupe::{duplicate_ids, DedupePlan};
use crate::domain::{CellValue, FormularyError, Result, RowValues, Table};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// One stored row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Insertion-order id
    pub id: i64,
    /// Loaded cells, ordered as the table's columns
    pub values: RowValues,
    /// Derived aggregate value; always `None` for tables without one
    pub derived: Option<i64>,
}

impl StoredRow {
    /// Cell of a loaded column by name
    pub fn get(&self, table: Table, column: &str) -> Option<&CellValue> {
        table.column_index(column).and_then(|idx| self.values.get(idx))
    }

    fn identity(&self, table: Table, columns: &[&'static str]) -> Result<Vec<CellValue>> {
        columns
            .iter()
            .map(|column| {
                if Some(*column) == table.derived_column() {
                    return Ok(CellValue::Integer(self.derived));
                }
                self.get(table, column).cloned().ok_or_else(|| {
                    FormularyError::Dedupe(format!(
                        "Column '{}' does not exist on table '{}'",
                        column, table
                    ))
                })
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct TableData {
    rows: Vec<StoredRow>,
    batches: Vec<usize>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    tables: BTreeMap<Table, TableData>,
}

/// In-memory [`TableStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| FormularyError::Database("In-memory store lock poisoned".to_string()))
    }

    /// Snapshot of a table's rows in id order
    pub fn rows(&self, table: Table) -> Result<Vec<StoredRow>> {
        let state = self.lock()?;
        Ok(state
            .tables
            .get(&table)
            .map(|data| data.rows.clone())
            .unwrap_or_default())
    }

    /// Sizes of the batches committed to a table, in commit order
    pub fn committed_batches(&self, table: Table) -> Result<Vec<usize>> {
        let state = self.lock()?;
        Ok(state
            .tables
            .get(&table)
            .map(|data| data.batches.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        let mut state = self.lock()?;
        for table in Table::ALL {
            state.tables.entry(table).or_default();
        }
        Ok(())
    }

    async fn insert_batch(&self, table: Table, rows: Vec<RowValues>) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let width = table.columns().len();
        if let Some(bad) = rows.iter().find(|row| row.len() != width) {
            return Err(FormularyError::Validation(format!(
                "Row for '{}' has {} cells, expected {}",
                table,
                bad.len(),
                width
            )));
        }

        let mut state = self.lock()?;
        let first_id = state.next_id + 1;
        state.next_id += rows.len() as i64;

        let data = state.tables.entry(table).or_default();
        let count = rows.len();
        data.rows.extend(rows.into_iter().enumerate().map(|(offset, values)| StoredRow {
            id: first_id + offset as i64,
            values,
            derived: None,
        }));
        data.batches.push(count);
        Ok(count as u64)
    }

    async fn populate_aggregate(&self, spec: &AggregateSpec) -> Result<u64> {
        let mut state = self.lock()?;
        let data = state.tables.entry(spec.table).or_default();

        // compute before touching any row so a failure leaves the table as it was
        let counts = compute_counts(spec, data.rows.iter().map(|row| &row.values))?;
        for (row, count) in data.rows.iter_mut().zip(&counts) {
            row.derived = *count;
        }
        Ok(counts.iter().filter(|count| count.is_some()).count() as u64)
    }

    async fn remove_duplicates(&self, plan: &DedupePlan) -> Result<u64> {
        let mut state = self.lock()?;
        let data = state.tables.entry(plan.table).or_default();

        let keyed = data
            .rows
            .iter()
            .map(|row| Ok((row.id, row.identity(plan.table, &plan.columns)?)))
            .collect::<Result<Vec<_>>>()?;
        let doomed: HashSet<i64> = duplicate_ids(keyed).into_iter().collect();

        data.rows.retain(|row| !doomed.contains(&row.id));
        Ok(doomed.len() as u64)
    }

    async fn count_rows(&self, table: Table) -> Result<u64> {
        let state = self.lock()?;
        Ok(state
            .tables
            .get(&table)
            .map(|data| data.rows.len() as u64)
            .unwrap_or(0))
    }

    async fn count_linked_sales(&self) -> Result<u64> {
        let state = self.lock()?;
        let linked = state
            .tables
            .get(&Table::Sales)
            .map(|data| {
                data.rows
                    .iter()
                    .filter(|row| {
                        row.get(Table::Sales, "appl_no")
                            .is_some_and(|cell| !cell.is_null())
                    })
                    .count()
            })
            .unwrap_or(0);
        Ok(linked as u64)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
