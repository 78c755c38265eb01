//! Integration tests for logging functionality

use formulary::config::LoggingConfig;
use formulary::domain::FormularyError;
use formulary::logging::init_logging;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    // Only one subscriber may be installed per process; this is the only
    // test in this binary that installs one.
    let guard = init_logging("debug", &config).unwrap();
    tracing::info!("written to the log file");
    drop(guard);

    assert!(log_path.is_dir());
}

#[test]
fn test_invalid_level_rejected() {
    let config = LoggingConfig::default();
    let err = init_logging("chatty", &config).err().unwrap();
    assert!(matches!(err, FormularyError::Configuration(_)));
}

#[test]
fn test_logging_macros_usage() {
    // The macros expand to tracing events; without a subscriber they are no-ops
    formulary::log_stage_start!("LoadingProducts");
    formulary::log_stage_complete!("LoadingProducts", Duration::from_millis(15));
    formulary::log_batch_committed!("products", 1, 1000, 1000);
    formulary::log_batch_committed!("sales", 2, 500, 1500, 1210);

    let error = FormularyError::SourceRead("sales.csv: line 7: invalid byte".to_string());
    formulary::log_error_with_context!(&error, "Failed to read extract");
}
