//! Configuration management for docsync.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `DOCSYNC_<SECTION>_<KEY>`
//! environment overrides, defaults for optional settings, and validation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("docsync.toml")?;
//! println!("Database: {}", config.cosmosdb.database_name);
//! println!("Runs daily at {} UTC", config.schedule.daily_at);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`CosmosDbConfig`] - endpoint, key, database, throughput, procedure name
//! - [`ControlsConfig`] - control catalog import
//! - [`CustomersConfig`] - customer import source
//! - [`ScheduleConfig`] - daily trigger time and past-due grace
//! - [`LoggingConfig`] - local log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [cosmosdb]
//! endpoint = "https://your-account.documents.azure.com:443/"
//! key = "${DOCSYNC_COSMOS_KEY}"
//! database_name = "catalog-db"
//!
//! [customers]
//! enabled = true
//! source_url = "https://crm.example.com/api/customers"
//! api_key = "${DOCSYNC_CRM_TOKEN}"
//!
//! [schedule]
//! daily_at = "02:00"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ControlsConfig, CosmosDbConfig, CustomersConfig, LoggingConfig,
    ScheduleConfig, SyncConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
