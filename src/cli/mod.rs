//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for docsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// docsync - scheduled document synchronization into Azure Cosmos DB
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "docsync.toml", env = "DOCSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DOCSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the import jobs once
    Import(commands::import::ImportArgs),

    /// Run the import jobs on the daily schedule until interrupted
    Run(commands::run::RunArgs),

    /// Create the database, collections and bulk import procedures
    Provision(commands::provision::ProvisionArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
