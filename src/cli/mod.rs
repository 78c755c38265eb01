//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Formulary using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Formulary - drug dataset reconciliation and load pipeline
#[derive(Parser, Debug)]
#[command(name = "formulary")]
#[command(version, about, long_about = None)]
#[command(author = "Formulary Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "formulary.toml", env = "FORMULARY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FORMULARY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline: cross-reference, load, aggregate, deduplicate, verify
    Run(commands::run::RunArgs),

    /// Validate configuration file and extracts
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show row counts of the loaded tables
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
