//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Formulary configuration file and the extracts it points at.

use crate::adapters::source::{ExtractFormat, ExtractReader};
use crate::config::{load_config, DatabaseTarget, SourceConfig};
use crate::core::load::mappers::{
    EXCLUSIVITY_SOURCE_COLUMNS, PATENT_SOURCE_COLUMNS, PRODUCT_SOURCE_COLUMNS,
    SALES_SOURCE_COLUMNS,
};
use crate::core::xref::NDC_COLUMNS;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Only validate the file, do not open the extracts
    #[arg(long)]
    pub skip_sources: bool,
}

/// Columns each named extract is expected to carry
fn expected_columns(name: &str) -> &'static [&'static str] {
    match name {
        "ndc" => NDC_COLUMNS,
        "products" => PRODUCT_SOURCE_COLUMNS,
        "exclusivity" => EXCLUSIVITY_SOURCE_COLUMNS,
        "patents" => PATENT_SOURCE_COLUMNS,
        "sales" => SALES_SOURCE_COLUMNS,
        _ => &[],
    }
}

/// Opens an extract and returns the expected columns its header lacks
fn check_source(name: &str, source: &SourceConfig) -> crate::domain::Result<Vec<&'static str>> {
    let format = ExtractFormat::from_config(source)?;
    let reader = ExtractReader::open(name, &source.path, format)?;
    Ok(reader.missing_columns(expected_columns(name)))
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);

        match config.effective_target() {
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    println!("  Database Target: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        pg_config.connection_string.expose_secret().redacted_url()
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                    println!("  SSL Mode: {}", pg_config.ssl_mode);
                }
            }
            DatabaseTarget::Memory => println!("  Database Target: in-memory"),
        }

        println!("  Batch Size: {}", config.pipeline.batch_size);
        println!("  Ensure Schema: {}", config.pipeline.ensure_schema);
        println!();

        if self.skip_sources {
            return Ok(0);
        }

        println!("Sources:");
        let mut unreadable = 0;
        for (name, source) in config.sources.named() {
            match check_source(name, source) {
                Ok(missing) if missing.is_empty() => {
                    println!("  ✅ {name:<12} {} ({})", source.path.display(), source.encoding);
                }
                Ok(missing) => {
                    println!("  ⚠️  {name:<12} {} ({})", source.path.display(), source.encoding);
                    println!("     Missing columns (loaded as null): {}", missing.join(", "));
                }
                Err(e) => {
                    unreadable += 1;
                    println!("  ❌ {name:<12} {}", source.path.display());
                    println!("     Error: {e}");
                }
            }
        }
        println!();

        if unreadable > 0 {
            println!("❌ {unreadable} source(s) cannot be read");
            return Ok(2); // Configuration error exit code
        }

        Ok(0)
    }
}
