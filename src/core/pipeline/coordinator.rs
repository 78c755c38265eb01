//! Pipeline coordinator - sequences the stages of a run
//!
//! Every stage runs to completion before the next one starts. Each store
//! call is its own transaction, so a failure rolls back only the work of
//! the call in progress; batches committed by earlier calls stay in place.

use crate::adapters::database::{create_table_store, TableStore};
use crate::adapters::source::{ExtractFormat, ExtractReader};
use crate::config::{FormularyConfig, SourceConfig, SourcesConfig};
use crate::core::aggregate::populate_aggregates;
use crate::core::dedupe::remove_duplicates;
use crate::core::load::{
    ExclusivityMapper, LoadReport, PatentMapper, ProductMapper, RowMapper, SalesMapper,
    TableLoader,
};
use crate::core::pipeline::summary::{PipelineStage, PipelineSummary, StageFailure, XrefStats};
use crate::core::verification::collect_final_counts;
use crate::core::xref::build_cross_reference;
use crate::domain::{Result, TableRecord};
use crate::{log_error_with_context, log_stage_complete, log_stage_start};
use std::sync::Arc;
use std::time::Instant;

type StageResult<T> = std::result::Result<T, StageFailure>;

/// The five extracts, each fully decoded once and reopened for streaming
struct Extracts {
    ndc: ExtractReader,
    products: ExtractReader,
    exclusivity: ExtractReader,
    patents: ExtractReader,
    sales: ExtractReader,
}

impl Extracts {
    fn open(sources: &SourcesConfig) -> Result<Self> {
        fn open_one(name: &str, source: &SourceConfig) -> Result<ExtractReader> {
            let format = ExtractFormat::from_config(source)?;
            let rows = ExtractReader::open(name, &source.path, format)?.check_decodes()?;
            tracing::debug!(source = name, rows, "Extract decodes cleanly");
            ExtractReader::open(name, &source.path, format)
        }

        Ok(Self {
            ndc: open_one("ndc", &sources.ndc)?,
            products: open_one("products", &sources.products)?,
            exclusivity: open_one("exclusivity", &sources.exclusivity)?,
            patents: open_one("patents", &sources.patents)?,
            sales: open_one("sales", &sources.sales)?,
        })
    }
}

/// Pipeline coordinator
pub struct PipelineCoordinator {
    config: FormularyConfig,
    store: Arc<dyn TableStore>,
}

impl PipelineCoordinator {
    /// Create a coordinator over the store selected by configuration
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the configuration is invalid or
    /// the store cannot be created.
    pub fn new(config: FormularyConfig) -> Result<Self> {
        let store = create_table_store(&config)?;
        Ok(Self::with_store(config, store))
    }

    /// Create a coordinator over an existing store
    pub fn with_store(config: FormularyConfig, store: Arc<dyn TableStore>) -> Self {
        Self { config, store }
    }

    /// Store the coordinator writes to
    pub fn store(&self) -> &Arc<dyn TableStore> {
        &self.store
    }

    /// Execute the pipeline
    ///
    /// This is the main entry point of a run. It:
    /// 1. Decodes all five extracts end to end (nothing is written if one
    ///    is unreadable or holds bytes invalid in its encoding)
    /// 2. Checks store connectivity and applies the schema if configured
    /// 3. Builds the cross-reference
    /// 4. Loads products, exclusivity, patents, then sales
    /// 5. Populates the aggregate columns
    /// 6. Removes duplicates from the approval tables
    /// 7. Collects the final counts
    ///
    /// Any failure, including an unreachable store, ends the run in
    /// `Failed` and is reported on the returned summary.
    pub async fn execute(&self) -> PipelineSummary {
        let start_time = Instant::now();
        let mut summary = PipelineSummary::new(self.store.backend_name());

        tracing::info!(
            backend = self.store.backend_name(),
            batch_size = self.config.pipeline.batch_size,
            "Starting pipeline run"
        );

        let mut extracts = match Extracts::open(&self.config.sources) {
            Ok(extracts) => extracts,
            Err(e) => {
                log_error_with_context!(&e, "Failed to open extracts");
                summary.fail(StageFailure::new(summary.stage, &e));
                return self.finish(summary, start_time);
            }
        };

        if let Err(e) = self.prepare_store().await {
            log_error_with_context!(&e, "Store is not ready");
            summary.fail(StageFailure::new(summary.stage, &e));
            return self.finish(summary, start_time);
        }

        if let Err(failure) = self.run_stages(&mut extracts, &mut summary).await {
            tracing::error!(stage = %failure.stage, error = %failure.message, "Stage failed");
            summary.fail(failure);
        }

        self.finish(summary, start_time)
    }

    async fn prepare_store(&self) -> Result<()> {
        self.store.test_connection().await?;
        if self.config.pipeline.ensure_schema {
            self.store.ensure_schema().await?;
        }
        Ok(())
    }

    fn finish(&self, summary: PipelineSummary, start_time: Instant) -> PipelineSummary {
        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        summary
    }

    async fn run_stages(
        &self,
        extracts: &mut Extracts,
        summary: &mut PipelineSummary,
    ) -> StageResult<()> {
        let store = self.store.as_ref();

        // BuildingXref
        let stage_start = Instant::now();
        log_stage_start!(summary.stage);
        let xref = build_cross_reference(&mut extracts.ndc)
            .map_err(|e| StageFailure::new(PipelineStage::BuildingXref, &e))?;
        summary.xref = Some(XrefStats::from(&xref));
        self.complete(summary, stage_start);

        // Loading*
        let report = self
            .load_table(summary, &mut extracts.products, &ProductMapper)
            .await?;
        summary.loads.push(report);
        let report = self
            .load_table(summary, &mut extracts.exclusivity, &ExclusivityMapper)
            .await?;
        summary.loads.push(report);
        let report = self
            .load_table(summary, &mut extracts.patents, &PatentMapper)
            .await?;
        summary.loads.push(report);
        let report = self
            .load_table(summary, &mut extracts.sales, &SalesMapper::new(&xref))
            .await?;
        summary.loads.push(report);

        // Aggregating
        let stage_start = Instant::now();
        log_stage_start!(summary.stage);
        summary.aggregates = populate_aggregates(store)
            .await
            .map_err(|e| StageFailure::new(PipelineStage::Aggregating, &e))?;
        self.complete(summary, stage_start);

        // Deduplicating
        let stage_start = Instant::now();
        log_stage_start!(summary.stage);
        summary.dedupes = remove_duplicates(store)
            .await
            .map_err(|e| StageFailure::new(PipelineStage::Deduplicating, &e))?;
        self.complete(summary, stage_start);

        // Verifying
        let stage_start = Instant::now();
        log_stage_start!(summary.stage);
        summary.final_counts = Some(
            collect_final_counts(store)
                .await
                .map_err(|e| StageFailure::new(PipelineStage::Verifying, &e))?,
        );
        self.complete(summary, stage_start);

        Ok(())
    }

    async fn load_table<M>(
        &self,
        summary: &mut PipelineSummary,
        reader: &mut ExtractReader,
        mapper: &M,
    ) -> StageResult<LoadReport>
    where
        M: RowMapper + Sync,
    {
        let stage = PipelineStage::loading(<M::Record as TableRecord>::TABLE);
        debug_assert_eq!(stage, summary.stage);

        let stage_start = Instant::now();
        log_stage_start!(stage);

        let mut loader = TableLoader::new(self.store.as_ref(), self.config.pipeline.batch_size);
        let report = loader
            .load(reader, mapper)
            .await
            .map_err(|e| StageFailure::from_load(stage, &e, loader.report()))?;

        self.complete(summary, stage_start);
        Ok(report)
    }

    fn complete(&self, summary: &mut PipelineSummary, stage_start: Instant) {
        log_stage_complete!(summary.stage, stage_start.elapsed());
        summary.advance();
    }
}
