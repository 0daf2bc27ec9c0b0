//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates; a loaded configuration is valid.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");
        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Cosmos DB Endpoint: {}", config.cosmosdb.endpoint);
        println!("  Cosmos DB Database: {}", config.cosmosdb.database_name);
        println!(
            "  Throughput: {}",
            config
                .cosmosdb
                .throughput
                .map_or_else(|| "account default".to_string(), |t| format!("{t} RU/s"))
        );
        println!("  Bulk Procedure: {}", config.cosmosdb.procedure_name);
        println!(
            "  Controls: {} (collection '{}')",
            enabled(config.controls.enabled),
            config.controls.collection
        );
        println!(
            "  Customers: {} (collection '{}')",
            enabled(config.customers.enabled),
            config.customers.collection
        );
        println!(
            "  Schedule: daily at {} UTC, past due after {}s",
            config.schedule.daily_at, config.schedule.past_due_grace_seconds
        );
        println!();

        Ok(0)
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}
