//! Init command implementation
//!
//! Writes a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Sample configuration written by `docsync init`
pub const SAMPLE_CONFIG: &str = r#"# docsync configuration
#
# Values of the form ${VAR} are read from the environment (or a .env file).
# Any key can also be overridden with DOCSYNC_<SECTION>_<KEY>.

[application]
# trace, debug, info, warn, error
log_level = "info"
# Read sources but do not write to Cosmos DB
dry_run = false

[cosmosdb]
endpoint = "https://your-account.documents.azure.com:443/"
key = "${DOCSYNC_COSMOS_KEY}"
database_name = "catalog-db"
# Manual RU/s for newly created collections
throughput = 400
procedure_name = "BulkImport"
request_timeout_seconds = 30

[controls]
# Security-control catalog shipped with the binary
enabled = true
collection = "controls"

[customers]
enabled = false
collection = "customers"
# source_url = "https://crm.example.com/api/customers"
# api_key = "${DOCSYNC_CRM_TOKEN}"
timeout_seconds = 60

[schedule]
# UTC time of the daily import
daily_at = "02:00"
# Runs starting later than this are logged as past due
past_due_grace_seconds = 300

[logging]
local_enabled = true
local_path = "/var/log/docsync"
# daily or hourly
local_rotation = "daily"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "docsync.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, SAMPLE_CONFIG) {
            Ok(()) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your Cosmos DB account", self.output);
                println!("  2. Set DOCSYNC_COSMOS_KEY in the environment or a .env file");
                println!("  3. Validate configuration: docsync validate-config");
                println!("  4. Create resources: docsync provision");
                println!("  5. Run once: docsync import");
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}
