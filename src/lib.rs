// Formulary - Drug Dataset Reconciliation and Load Pipeline
// Copyright (c) 2025 Formulary Contributors
// Licensed under the MIT License

//! # Formulary - drug dataset reconciliation and load
//!
//! Formulary reads five delimited extracts describing approved drug
//! products, market exclusivity, patents, retail sales and a labeler/product
//! code to application number mapping, and loads them into a relational
//! store as four cleaned, linked and deduplicated tables.
//!
//! ## Overview
//!
//! A run:
//! - **Builds** the code cross-reference from the identifier extract
//! - **Loads** products, exclusivity, patents and sales in fixed-size batches,
//!   normalizing every cell and linking sales rows to application numbers
//! - **Aggregates** `approval_count` on products and `seller_count` on sales
//! - **Deduplicates** the three approval tables
//! - **Verifies** by reporting final row counts
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline logic (normalize, xref, load, aggregate, dedupe, pipeline)
//! - [`adapters`] - Extract reader and the PostgreSQL / in-memory stores
//! - [`domain`] - Table catalogue, records and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formulary::config::load_config;
//! use formulary::core::pipeline::PipelineCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("formulary.toml")?;
//!     let coordinator = PipelineCoordinator::new(config)?;
//!
//!     let summary = coordinator.execute().await;
//!     println!("Final stage: {}", summary.stage);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error is
//! [`domain::FormularyError`]. A malformed cell is not an error; it loads as
//! null.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
