//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output for operators
//! - JSON-formatted local log files with rotation
//! - Configurable log levels (overridable with `RUST_LOG`)
//!
//! # Example
//!
//! ```no_run
//! use formulary::logging::init_logging;
//! use formulary::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Pipeline started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use formulary::log_stage_start;
///
/// log_stage_start!("LoadingProducts");
/// ```
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr) => {
        tracing::info!(stage = %$stage, "Stage started");
    };
}

/// Log the completion of a pipeline stage
///
/// # Example
///
/// ```no_run
/// use formulary::log_stage_complete;
/// use std::time::Duration;
///
/// log_stage_complete!("Aggregating", Duration::from_millis(1200));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $duration:expr) => {
        tracing::info!(
            stage = %$stage,
            duration_ms = $duration.as_millis() as u64,
            "Stage completed"
        );
    };
}

/// Log a committed loader batch
///
/// The four-argument form also reports how many rows so far carry a
/// linking identifier.
///
/// # Example
///
/// ```no_run
/// use formulary::log_batch_committed;
///
/// log_batch_committed!("products", 3, 1000, 3000);
/// log_batch_committed!("sales", 1, 1000, 1000, 812);
/// ```
#[macro_export]
macro_rules! log_batch_committed {
    ($table:expr, $batch:expr, $rows:expr, $total:expr) => {
        tracing::info!(
            table = %$table,
            batch = $batch,
            rows = $rows,
            total_rows = $total,
            "Batch committed"
        );
    };
    ($table:expr, $batch:expr, $rows:expr, $total:expr, $linked:expr) => {
        tracing::info!(
            table = %$table,
            batch = $batch,
            rows = $rows,
            total_rows = $total,
            linked_rows = $linked,
            "Batch committed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use formulary::log_error_with_context;
/// use formulary::domain::FormularyError;
///
/// let error = FormularyError::SourceRead("missing file".to_string());
/// log_error_with_context!(&error, "Failed to open extracts");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
