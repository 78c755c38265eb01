//! Core business logic for Formulary.
//!
//! This module contains the reconciliation and load logic.
//!
//! # Modules
//!
//! - [`normalize`] - Field normalization of raw extract cells
//! - [`xref`] - Labeler/product code to application number cross-reference
//! - [`load`] - Batching table loader and per-source row mappers
//! - [`aggregate`] - Derived count columns
//! - [`dedupe`] - Duplicate removal in the approval tables
//! - [`verification`] - Read-only final counts
//! - [`pipeline`] - Stage sequencing and run summary
//!
//! # Pipeline Workflow
//!
//! 1. **Build cross-reference** from the identifier extract
//! 2. **Load** products, exclusivity, patents and sales in fixed-size batches
//! 3. **Aggregate**: recompute `approval_count` and `seller_count`
//! 4. **Deduplicate** the three approval tables
//! 5. **Verify**: report final row counts
//!
//! # Example
//!
//! ```rust,no_run
//! use formulary::config::load_config;
//! use formulary::core::pipeline::PipelineCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("formulary.toml")?;
//! let coordinator = PipelineCoordinator::new(config)?;
//!
//! let summary = coordinator.execute().await;
//! println!("{}", summary.format_report());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod dedupe;
pub mod load;
pub mod normalize;
pub mod pipeline;
pub mod verification;
pub mod xref;
