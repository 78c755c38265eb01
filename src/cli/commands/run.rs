//! Run command implementation
//!
//! This module implements the `run` command, which executes the full
//! reconciliation pipeline against the configured store.

use crate::config::{load_config, DatabaseTarget};
use crate::core::pipeline::{PipelineCoordinator, PipelineStage};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - load into an in-memory store, nothing is persisted
    #[arg(long)]
    pub dry_run: bool,

    /// Override rows per committed batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size, "Overriding batch size from CLI");
            config.pipeline.batch_size = batch_size;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - no data will be persisted");
            println!("🔍 DRY RUN MODE - Loading into an in-memory store");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !dry_run {
            println!("Run Configuration:");
            match config.effective_target() {
                DatabaseTarget::PostgreSQL => {
                    if let Some(ref pg) = config.postgresql {
                        println!(
                            "  Target: PostgreSQL ({})",
                            pg.connection_string.expose_secret().redacted_url()
                        );
                    }
                }
                DatabaseTarget::Memory => println!("  Target: in-memory store"),
            }
            println!("  Batch size: {}", config.pipeline.batch_size);
            for (name, source) in config.sources.named() {
                println!("  Source {name}: {}", source.path.display());
            }
            println!();
            println!("The run appends to the target tables and rewrites their aggregate columns.");
            print!("Proceed? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Run cancelled.");
                return Ok(0);
            }
        }

        // Create pipeline coordinator
        tracing::info!("Creating pipeline coordinator");
        let coordinator = match PipelineCoordinator::new(config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create pipeline coordinator");
                eprintln!("Failed to initialize store: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("🚀 Starting pipeline...");
        println!();

        let summary = coordinator.execute().await;

        // Display summary
        println!("📊 Pipeline Summary:");
        print!("{}", summary.format_report());
        println!();

        let exit_code = match (&summary.stage, &summary.failure) {
            (PipelineStage::Done, _) => {
                println!("✅ Pipeline completed successfully!");
                0
            }
            (_, Some(failure)) if failure.connection => {
                println!("❌ Store connection failed during {}", failure.stage);
                4 // Connection error exit code
            }
            (_, Some(failure)) => {
                println!("❌ Pipeline failed during {}", failure.stage);
                if failure.batches_committed > 0 {
                    println!(
                        "   {} batches of that stage stay committed; the store is partially loaded.",
                        failure.batches_committed
                    );
                }
                5 // Fatal error exit code
            }
            (stage, None) => {
                println!("❌ Pipeline stopped in {stage}");
                5
            }
        };

        Ok(exit_code)
    }
}
