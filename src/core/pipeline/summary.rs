//! Pipeline state and run summary
//!
//! This module defines the stage state machine and the structures that
//! record what each stage did.

use crate::core::aggregate::AggregateOutcome;
use crate::core::dedupe::DedupeOutcome;
use crate::core::load::LoadReport;
use crate::core::verification::FinalCounts;
use crate::core::xref::CrossReference;
use crate::domain::{FormularyError, Table};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Stage of a pipeline run
///
/// Stages run strictly in declaration order. `Failed` is terminal and
/// reachable from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PipelineStage {
    BuildingXref,
    LoadingProducts,
    LoadingExclusivity,
    LoadingPatents,
    LoadingSales,
    Aggregating,
    Deduplicating,
    Verifying,
    Done,
    Failed,
}

impl PipelineStage {
    /// Stage that follows this one on success
    ///
    /// Terminal stages have no successor.
    pub fn next(self) -> Option<Self> {
        use PipelineStage::*;
        match self {
            BuildingXref => Some(LoadingProducts),
            LoadingProducts => Some(LoadingExclusivity),
            LoadingExclusivity => Some(LoadingPatents),
            LoadingPatents => Some(LoadingSales),
            LoadingSales => Some(Aggregating),
            Aggregating => Some(Deduplicating),
            Deduplicating => Some(Verifying),
            Verifying => Some(Done),
            Done | Failed => None,
        }
    }

    /// Whether the run has stopped
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// Loading stage of a table
    pub fn loading(table: Table) -> Self {
        match table {
            Table::Products => PipelineStage::LoadingProducts,
            Table::Exclusivity => PipelineStage::LoadingExclusivity,
            Table::Patents => PipelineStage::LoadingPatents,
            Table::Sales => PipelineStage::LoadingSales,
        }
    }

    /// Stage name as logged
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::BuildingXref => "BuildingXref",
            PipelineStage::LoadingProducts => "LoadingProducts",
            PipelineStage::LoadingExclusivity => "LoadingExclusivity",
            PipelineStage::LoadingPatents => "LoadingPatents",
            PipelineStage::LoadingSales => "LoadingSales",
            PipelineStage::Aggregating => "Aggregating",
            PipelineStage::Deduplicating => "Deduplicating",
            PipelineStage::Verifying => "Verifying",
            PipelineStage::Done => "Done",
            PipelineStage::Failed => "Failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why and where a run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    /// Stage that was running
    pub stage: PipelineStage,

    /// Source rows consumed by the stage before it failed
    pub rows_reached: usize,

    /// Batches the stage committed before it failed
    pub batches_committed: usize,

    /// Error message
    pub message: String,

    /// The failure was a connectivity problem
    pub connection: bool,
}

impl StageFailure {
    /// Failure of a stage that has no row progress to report
    pub fn new(stage: PipelineStage, error: &FormularyError) -> Self {
        Self {
            stage,
            rows_reached: 0,
            batches_committed: 0,
            message: error.to_string(),
            connection: error.is_connection(),
        }
    }

    /// Failure of a loading stage, carrying the loader's progress
    pub fn from_load(
        stage: PipelineStage,
        error: &FormularyError,
        progress: Option<&LoadReport>,
    ) -> Self {
        let mut failure = Self::new(stage, error);
        if let Some(progress) = progress {
            failure.rows_reached = progress.rows_read;
            failure.batches_committed = progress.batches_committed();
        }
        failure
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed after {} rows ({} batches committed): {}",
            self.stage, self.rows_reached, self.batches_committed, self.message
        )
    }
}

/// Cross-reference build statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct XrefStats {
    pub rows_read: usize,
    pub entries: usize,
    pub skipped: usize,
    pub conflicts: usize,
}

impl From<&CrossReference> for XrefStats {
    fn from(xref: &CrossReference) -> Self {
        Self {
            rows_read: xref.rows_read(),
            entries: xref.len(),
            skipped: xref.skipped(),
            conflicts: xref.conflicts(),
        }
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    /// Store the run wrote to
    pub backend: String,

    /// Current or final stage
    pub stage: PipelineStage,

    /// Cross-reference statistics (once built)
    pub xref: Option<XrefStats>,

    /// One report per completed table load
    pub loads: Vec<LoadReport>,

    /// Aggregate pass outcomes
    pub aggregates: Vec<AggregateOutcome>,

    /// Duplicate removal outcomes
    pub dedupes: Vec<DedupeOutcome>,

    /// Final counts (once verified)
    pub final_counts: Option<FinalCounts>,

    /// Set when the run ended in `Failed`
    pub failure: Option<StageFailure>,

    /// Duration of the run
    pub duration: Duration,
}

impl PipelineSummary {
    /// Create a summary positioned at the first stage
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            stage: PipelineStage::BuildingXref,
            xref: None,
            loads: Vec::new(),
            aggregates: Vec::new(),
            dedupes: Vec::new(),
            final_counts: None,
            failure: None,
            duration: Duration::from_secs(0),
        }
    }

    /// Move to the next stage
    ///
    /// Has no effect once the run is terminal.
    pub fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            self.stage = next;
        }
    }

    /// Record a failure and enter `Failed`
    pub fn fail(&mut self, failure: StageFailure) {
        self.stage = PipelineStage::Failed;
        self.failure = Some(failure);
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the run reached `Done`
    pub fn is_successful(&self) -> bool {
        self.stage == PipelineStage::Done
    }

    /// Load report of one table, if it completed
    pub fn load(&self, table: Table) -> Option<&LoadReport> {
        self.loads.iter().find(|r| r.table == table)
    }

    /// Rows removed by deduplication across all tables
    pub fn total_rows_removed(&self) -> u64 {
        self.dedupes.iter().map(|d| d.rows_removed).sum()
    }

    /// Format the summary for the terminal
    pub fn format_report(&self) -> String {
        let mut out = String::new();

        if let Some(xref) = &self.xref {
            out.push_str(&format!(
                "Cross-reference: {} entries from {} rows ({} skipped, {} conflicts)\n",
                xref.entries, xref.rows_read, xref.skipped, xref.conflicts
            ));
        }

        for load in &self.loads {
            out.push_str(&format!(
                "Loaded {:<12} {} rows in {} batches",
                load.table.name(),
                load.rows_loaded,
                load.batches_committed()
            ));
            if load.table == Table::Sales {
                out.push_str(&format!(" ({} linked)", load.linked_rows));
            }
            out.push('\n');
        }

        for aggregate in &self.aggregates {
            out.push_str(&format!(
                "Populated {}.{}: {} rows\n",
                aggregate.table.name(),
                aggregate.column,
                aggregate.rows_populated
            ));
        }

        for dedupe in &self.dedupes {
            out.push_str(&format!(
                "Removed {} duplicate rows from {}\n",
                dedupe.rows_removed,
                dedupe.table.name()
            ));
        }

        if let Some(counts) = &self.final_counts {
            out.push_str(&counts.format_summary());
        }

        if let Some(failure) = &self.failure {
            out.push_str(&format!("Run failed: {failure}\n"));
        }

        out.push_str(&format!(
            "Final stage: {} ({:.1}s on {})\n",
            self.stage,
            self.duration.as_secs_f64(),
            self.backend
        ));
        out
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            backend = %self.backend,
            stage = %self.stage,
            tables_loaded = self.loads.len(),
            rows_removed = self.total_rows_removed(),
            duration_secs = self.duration.as_secs(),
            "Pipeline finished"
        );

        if let Some(failure) = &self.failure {
            tracing::error!(
                stage = %failure.stage,
                rows_reached = failure.rows_reached,
                batches_committed = failure.batches_committed,
                message = %failure.message,
                "Pipeline failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_chain_to_done() {
        let mut stage = PipelineStage::BuildingXref;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            visited.push(stage);
        }
        assert_eq!(stage, PipelineStage::Done);
        assert_eq!(visited.len(), 9);
        assert!(!visited.contains(&PipelineStage::Failed));
        assert_eq!(visited[5], PipelineStage::Aggregating);
        assert_eq!(visited[6], PipelineStage::Deduplicating);
    }

    #[test]
    fn test_terminal_stages() {
        assert!(PipelineStage::Done.is_terminal());
        assert!(PipelineStage::Failed.is_terminal());
        assert!(!PipelineStage::Verifying.is_terminal());
        assert_eq!(PipelineStage::Failed.next(), None);
    }

    #[test]
    fn test_loading_stage_per_table() {
        assert_eq!(
            PipelineStage::loading(Table::Patents),
            PipelineStage::LoadingPatents
        );
        assert_eq!(PipelineStage::loading(Table::Sales).to_string(), "LoadingSales");
    }

    #[test]
    fn test_fail_is_sticky() {
        let mut summary = PipelineSummary::new("memory");
        summary.advance();
        let error = FormularyError::SourceRead("bad byte".to_string());
        summary.fail(StageFailure::new(summary.stage, &error));
        summary.advance();

        assert_eq!(summary.stage, PipelineStage::Failed);
        assert!(!summary.is_successful());
        let failure = summary.failure.as_ref().unwrap();
        assert_eq!(failure.stage, PipelineStage::LoadingProducts);
        assert!(!failure.connection);
    }

    #[test]
    fn test_failure_carries_loader_progress() {
        let progress = LoadReport {
            table: Table::Exclusivity,
            rows_read: 2100,
            rows_loaded: 2000,
            batches: vec![1000, 1000],
            linked_rows: 0,
        };
        let error = FormularyError::BatchCommit {
            table: "exclusivity".to_string(),
            batch: 3,
            rows_committed: 2000,
            message: "disk full".to_string(),
        };
        let failure =
            StageFailure::from_load(PipelineStage::LoadingExclusivity, &error, Some(&progress));
        assert_eq!(failure.rows_reached, 2100);
        assert_eq!(failure.batches_committed, 2);
        assert!(failure.to_string().contains("LoadingExclusivity"));
    }

    #[test]
    fn test_format_report_mentions_linked_sales() {
        let mut summary = PipelineSummary::new("memory");
        summary.loads.push(LoadReport {
            table: Table::Sales,
            rows_read: 3,
            rows_loaded: 3,
            batches: vec![3],
            linked_rows: 2,
        });
        let report = summary.format_report();
        assert!(report.contains("(2 linked)"));
        assert!(report.contains("BuildingXref"));
    }
}
