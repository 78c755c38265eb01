//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "formulary.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Formulary configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your extract paths and encodings", self.output);
                println!("  2. Set FORMULARY_PG_URL (or put it in a .env file)");
                println!("  3. Validate configuration: formulary validate-config");
                println!("  4. Try a dry run: formulary run --dry-run");
                println!("  5. Load the database: formulary run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Sample configuration with comments
    fn sample_config() -> &'static str {
        r#"# Formulary Configuration File
# Drug dataset reconciliation and load pipeline

# Store target (postgresql or memory)
database_target = "postgresql"

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Load into an in-memory store instead of the database
dry_run = false

[postgresql]
# postgresql://[user[:password]@][host][:port][/dbname]
connection_string = "${FORMULARY_PG_URL}"
max_connections = 4
connection_timeout_seconds = 30
statement_timeout_seconds = 600

# disable | prefer | require | verify-ca | verify-full
ssl_mode = "prefer"

[pipeline]
# Rows per committed batch (1-5000)
batch_size = 1000

# Apply migrations/001_initial_schema.sql before loading
ensure_schema = true

# Each source takes a path, an encoding label (default utf-8) and a
# delimiter (default ","; use "\t" for tab)
[sources.products]
path = "data/products.csv"

[sources.exclusivity]
path = "data/exclusivity.csv"

[sources.patents]
path = "data/patent.csv"

[sources.sales]
path = "data/sales.csv"
encoding = "latin1"

[sources.ndc]
path = "data/ndc.csv"
encoding = "latin1"

[logging]
# JSON log files next to console output
local_enabled = false
local_path = "logs"

# daily | hourly | never
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_str, DatabaseTarget};
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "formulary.toml".to_string(),
            force: false,
        };

        assert_eq!(args.output, "formulary.toml");
        assert!(!args.force);
    }

    #[test]
    fn test_sample_config_parses() {
        std::env::set_var("FORMULARY_PG_URL", "postgresql://u:p@localhost:5432/drugs");
        let config = load_config_str(InitArgs::sample_config()).unwrap();
        assert_eq!(config.database_target, DatabaseTarget::PostgreSQL);
        assert_eq!(config.pipeline.batch_size, 1000);
        assert_eq!(config.sources.sales.encoding, "latin1");
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("formulary.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }
}
