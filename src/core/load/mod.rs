//! Table loader
//!
//! Streams one extract through a [`RowMapper`], accumulates normalized rows
//! and commits them to the store in fixed-size batches. Each batch is its
//! own transaction; the remainder is committed after the extract is
//! exhausted, and an empty remainder is never committed. A failed batch is
//! not retried.

pub mod mappers;

pub use mappers::{ExclusivityMapper, PatentMapper, ProductMapper, RowMapper, SalesMapper};

use crate::adapters::database::TableStore;
use crate::adapters::source::ExtractReader;
use crate::domain::{FormularyError, Result, RowValues, Table, TableRecord};
use crate::log_batch_committed;
use serde::Serialize;

/// Progress and outcome of loading one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Target table
    pub table: Table,
    /// Rows read from the extract
    pub rows_read: usize,
    /// Rows committed to the store
    pub rows_loaded: usize,
    /// Size of every committed batch, in commit order
    pub batches: Vec<usize>,
    /// Committed rows carrying a linking identifier (sales only)
    pub linked_rows: usize,
}

impl LoadReport {
    fn new(table: Table) -> Self {
        Self {
            table,
            rows_read: 0,
            rows_loaded: 0,
            batches: Vec::new(),
            linked_rows: 0,
        }
    }

    /// Number of committed batches
    pub fn batches_committed(&self) -> usize {
        self.batches.len()
    }
}

/// Batching loader for one table
pub struct TableLoader<'a> {
    store: &'a dyn TableStore,
    batch_size: usize,
    report: Option<LoadReport>,
}

impl<'a> TableLoader<'a> {
    /// Creates a loader committing `batch_size` rows per transaction
    pub fn new(store: &'a dyn TableStore, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
            report: None,
        }
    }

    /// Progress of the most recent load, including one that failed midway
    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }

    /// Loads every row of `reader` into the mapper's table
    ///
    /// # Errors
    ///
    /// Returns `SourceRead` if the extract breaks midway and `BatchCommit`
    /// if the store rejects a batch. Batches committed before the failure
    /// stay committed.
    pub async fn load<M>(&mut self, reader: &mut ExtractReader, mapper: &M) -> Result<LoadReport>
    where
        M: RowMapper + Sync,
    {
        let table = M::Record::TABLE;
        reader.warn_missing_columns(mapper.source_columns());
        self.report = Some(LoadReport::new(table));

        let mut batch: Vec<RowValues> = Vec::with_capacity(self.batch_size);
        let mut batch_linked = 0;

        while let Some(row) = reader.next_row()? {
            let record = mapper.map(&row);
            if record.linking_identifier().is_some() {
                batch_linked += 1;
            }
            batch.push(record.into_values());
            self.record_read();

            if batch.len() >= self.batch_size {
                self.commit(table, std::mem::take(&mut batch), batch_linked)
                    .await?;
                batch_linked = 0;
            }
        }

        if !batch.is_empty() {
            self.commit(table, batch, batch_linked).await?;
        }

        let report = self.report.clone().unwrap_or_else(|| LoadReport::new(table));
        tracing::info!(
            table = %table,
            rows_read = report.rows_read,
            rows_loaded = report.rows_loaded,
            batches = report.batches_committed(),
            "Table loaded"
        );
        Ok(report)
    }

    fn record_read(&mut self) {
        if let Some(report) = self.report.as_mut() {
            report.rows_read += 1;
        }
    }

    async fn commit(&mut self, table: Table, rows: Vec<RowValues>, linked: usize) -> Result<()> {
        let size = rows.len();
        let (batch_no, committed_before) = self
            .report
            .as_ref()
            .map(|r| (r.batches.len() + 1, r.rows_loaded))
            .unwrap_or((1, 0));

        self.store
            .insert_batch(table, rows)
            .await
            .map_err(|e| FormularyError::BatchCommit {
                table: table.name().to_string(),
                batch: batch_no,
                rows_committed: committed_before,
                message: e.to_string(),
            })?;

        if let Some(report) = self.report.as_mut() {
            report.rows_loaded += size;
            report.linked_rows += linked;
            report.batches.push(size);

            if table == Table::Sales {
                log_batch_committed!(table, batch_no, size, report.rows_loaded, report.linked_rows);
            } else {
                log_batch_committed!(table, batch_no, size, report.rows_loaded);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::adapters::source::ExtractFormat;
    use crate::core::xref::{code_key, CrossReference};
    use std::io::Cursor;

    fn reader(data: String) -> ExtractReader {
        ExtractReader::from_reader("test", Cursor::new(data.into_bytes()), ExtractFormat::default())
            .unwrap()
    }

    fn products_csv(rows: usize) -> String {
        let mut data = String::from("Appl_No,Ingredient,Dosage\n");
        for i in 0..rows {
            data.push_str(&format!("N{i:06},ING{i},D\n"));
        }
        data
    }

    #[tokio::test]
    async fn test_batches_of_fixed_size_with_remainder() {
        let store = MemoryStore::new();
        let mut loader = TableLoader::new(&store, 1000);
        let report = loader
            .load(&mut reader(products_csv(2500)), &ProductMapper)
            .await
            .unwrap();

        assert_eq!(report.batches, vec![1000, 1000, 500]);
        assert_eq!(report.rows_loaded, 2500);
        assert_eq!(
            store.committed_batches(Table::Products).unwrap(),
            vec![1000, 1000, 500]
        );
        assert_eq!(store.count_rows(Table::Products).await.unwrap(), 2500);
    }

    #[tokio::test]
    async fn test_exact_multiple_commits_no_empty_batch() {
        let store = MemoryStore::new();
        let mut loader = TableLoader::new(&store, 10);
        let report = loader
            .load(&mut reader(products_csv(20)), &ProductMapper)
            .await
            .unwrap();
        assert_eq!(report.batches, vec![10, 10]);
    }

    #[tokio::test]
    async fn test_empty_extract_commits_nothing() {
        let store = MemoryStore::new();
        let mut loader = TableLoader::new(&store, 10);
        let report = loader
            .load(&mut reader(products_csv(0)), &ProductMapper)
            .await
            .unwrap();
        assert!(report.batches.is_empty());
        assert!(store.committed_batches(Table::Products).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sales_linked_rows_are_counted() {
        let mut xref = CrossReference::new();
        xref.offer(code_key(Some("1"), Some("1")).unwrap(), "N1".to_string());

        let data = "Labeler Code,Product Code,Ingredient\n1,1,A\n2,2,B\n1,0001,C\n".to_string();
        let store = MemoryStore::new();
        let mut loader = TableLoader::new(&store, 2);
        let report = loader
            .load(&mut reader(data), &SalesMapper::new(&xref))
            .await
            .unwrap();

        assert_eq!(report.table, Table::Sales);
        assert_eq!(report.rows_loaded, 3);
        assert_eq!(report.linked_rows, 2);
        assert_eq!(store.count_linked_sales().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_source_error_keeps_progress() {
        let mut data = products_csv(3).into_bytes();
        data.extend_from_slice(b"N9,\xff,D\n");
        let mut reader = ExtractReader::from_reader(
            "products",
            Cursor::new(data),
            ExtractFormat::default(),
        )
        .unwrap();

        let store = MemoryStore::new();
        let mut loader = TableLoader::new(&store, 2);
        let err = loader.load(&mut reader, &ProductMapper).await.unwrap_err();
        assert!(matches!(err, FormularyError::SourceRead(_)));

        let progress = loader.report().unwrap();
        assert_eq!(progress.batches, vec![2]);
        assert_eq!(progress.rows_read, 3);
        assert_eq!(store.count_rows(Table::Products).await.unwrap(), 2);
    }
}
