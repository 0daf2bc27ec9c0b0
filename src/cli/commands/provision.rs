//! Provision command implementation
//!
//! Creates the database, the collection of every enabled job and its bulk
//! import procedure. Existing resources are left untouched.

use super::{load_or_report, provider};
use crate::core::import::ImportCoordinator;
use clap::Args;

/// Arguments for the provision command
#[derive(Args, Debug)]
pub struct ProvisionArgs {}

impl ProvisionArgs {
    /// Execute the provision command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load_or_report(config_path) else {
            return Ok(2);
        };

        println!(
            "Provisioning database '{}' at {}",
            config.cosmosdb.database_name, config.cosmosdb.endpoint
        );

        let coordinator = ImportCoordinator::new(config.clone(), provider(&config));
        match coordinator.provision().await {
            Ok(outcomes) => {
                for (job, outcome) in outcomes {
                    let state = if outcome.created_any() {
                        "created"
                    } else {
                        "already provisioned"
                    };
                    println!("  {:<10} {state}", job.as_str());
                }
                println!("Provisioning complete");
                Ok(0)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Provisioning failed");
                eprintln!("Provisioning failed: {e}");
                Ok(4)
            }
        }
    }
}
