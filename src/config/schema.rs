//! Configuration schema types
//!
//! This module defines the configuration structure for docsync.

use crate::config::SecretString;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Main docsync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Azure Cosmos DB configuration
    pub cosmosdb: CosmosDbConfig,

    /// Control catalog import
    #[serde(default)]
    pub controls: ControlsConfig,

    /// Customer import
    #[serde(default)]
    pub customers: CustomersConfig,

    /// Daily trigger
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.cosmosdb.validate()?;
        self.controls.validate()?;
        self.customers.validate()?;
        self.schedule.validate()?;
        self.logging.validate()?;

        if self.controls.enabled
            && self.customers.enabled
            && self.controls.collection == self.customers.collection
        {
            return Err(format!(
                "controls.collection and customers.collection must differ, both are '{}'",
                self.controls.collection
            ));
        }

        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (parse and fetch, don't write to Cosmos DB)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Azure Cosmos DB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosmosDbConfig {
    /// Cosmos DB endpoint URL
    pub endpoint: String,

    /// Cosmos DB account key (base64)
    /// Stored securely in memory and automatically zeroized on drop
    pub key: SecretString,

    /// Database name
    pub database_name: String,

    /// Manual throughput (RU/s) for newly created collections
    #[serde(default = "default_throughput")]
    pub throughput: Option<u32>,

    /// Name the bulk import procedure is registered under
    #[serde(default = "default_procedure_name")]
    pub procedure_name: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl CosmosDbConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.endpoint.is_empty() {
            return Err("cosmosdb.endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("https://") {
            return Err("cosmosdb.endpoint must start with https://".to_string());
        }

        if self.key.expose_secret().is_empty() {
            return Err("cosmosdb.key cannot be empty".to_string());
        }

        if self.database_name.is_empty() {
            return Err("cosmosdb.database_name cannot be empty".to_string());
        }

        if let Some(throughput) = self.throughput {
            if throughput < 400 || throughput % 100 != 0 {
                return Err(format!(
                    "cosmosdb.throughput must be a multiple of 100 and at least 400, got {throughput}"
                ));
            }
        }

        if self.procedure_name.is_empty() {
            return Err("cosmosdb.procedure_name cannot be empty".to_string());
        }

        if self.request_timeout_seconds == 0 {
            return Err("cosmosdb.request_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Control catalog import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Collection holding security controls
    #[serde(default = "default_controls_collection")]
    pub collection: String,
}

impl ControlsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.collection.is_empty() {
            return Err("controls.collection cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collection: default_controls_collection(),
        }
    }
}

/// Customer import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomersConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Collection holding customers
    #[serde(default = "default_customers_collection")]
    pub collection: String,

    /// URL returning a JSON array of customer records
    #[serde(default)]
    pub source_url: Option<String>,

    /// Bearer token sent to the source
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl CustomersConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.collection.is_empty() {
            return Err("customers.collection cannot be empty".to_string());
        }

        match &self.source_url {
            None => {
                return Err(
                    "customers.source_url is required when customers.enabled = true".to_string(),
                )
            }
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                return Err(format!(
                    "customers.source_url must be an http(s) URL, got '{url}'"
                ));
            }
            Some(_) => {}
        }

        if self.timeout_seconds == 0 {
            return Err("customers.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for CustomersConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            collection: default_customers_collection(),
            source_url: None,
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Daily trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Time of day the import runs, "HH:MM" in UTC
    #[serde(default = "default_daily_at")]
    pub daily_at: String,

    /// A run starting later than this after its scheduled time is past due
    #[serde(default = "default_past_due_grace_seconds")]
    pub past_due_grace_seconds: u64,
}

impl ScheduleConfig {
    /// Parse `daily_at`
    pub fn time_of_day(&self) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(&self.daily_at, "%H:%M").map_err(|e| {
            format!(
                "Invalid schedule.daily_at '{}': expected HH:MM ({e})",
                self.daily_at
            )
        })
    }

    fn validate(&self) -> Result<(), String> {
        self.time_of_day().map(|_| ())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_at: default_daily_at(),
            past_due_grace_seconds: default_past_due_grace_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_throughput() -> Option<u32> {
    Some(400)
}

fn default_procedure_name() -> String {
    crate::repository::DEFAULT_PROCEDURE_NAME.to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_controls_collection() -> String {
    "controls".to_string()
}

fn default_customers_collection() -> String {
    "customers".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_daily_at() -> String {
    "02:00".to_string()
}

fn default_past_due_grace_seconds() -> u64 {
    300
}

fn default_local_path() -> String {
    "/var/log/docsync".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
