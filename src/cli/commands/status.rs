//! Status command implementation
//!
//! This module implements the `status` command, which prints the row
//! counts of the finalized tables without modifying them.

use crate::adapters::database::create_table_store;
use crate::config::{load_config, DatabaseTarget};
use crate::core::verification::collect_final_counts;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the counts as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking table status");

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        if config.effective_target() == DatabaseTarget::Memory {
            println!("The configured target is the in-memory store; it holds no data between runs.");
            return Ok(0);
        }

        let store = match create_table_store(&config) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to create store");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        if let Err(e) = store.test_connection().await {
            println!("❌ Failed to connect to database");
            println!("   Error: {}", e);
            return Ok(4); // Connection error exit code
        }

        let counts = match collect_final_counts(store.as_ref()).await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to count rows");
                println!("   Error: {}", e);
                return Ok(5); // Fatal error exit code
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&counts)?);
        } else {
            print!("{}", counts.format_summary());
        }

        Ok(0)
    }
}
