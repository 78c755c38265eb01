//! Configuration management for Formulary.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Formulary uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FORMULARY_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`PostgreSQLConfig`] - Connection pool and TLS settings
//! - [`PipelineConfig`] - Batch size and schema bootstrap
//! - [`SourcesConfig`] - Path, encoding and delimiter of each of the five extracts
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [postgresql]
//! connection_string = "${FORMULARY_PG_URL}"
//!
//! [pipeline]
//! batch_size = 1000
//!
//! [sources.products]
//! path = "data/products.csv"
//!
//! [sources.sales]
//! path = "data/sales.csv"
//! encoding = "latin1"
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use formulary::config::load_config;
//!
//! # fn example() {
//! match load_config("formulary.toml") {
//!     Ok(config) => println!("Batch size: {}", config.pipeline.batch_size),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, DatabaseTarget, FormularyConfig, LoggingConfig, PipelineConfig,
    PostgreSQLConfig, SourceConfig, SourcesConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
