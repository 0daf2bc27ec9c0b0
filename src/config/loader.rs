//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SyncConfig;
use super::secret::{secret_string, secret_string_opt};
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "DOCSYNC";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SyncConfig
/// 4. Applies environment variable overrides (DOCSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `SyncError::Configuration` if the file cannot be read or parsed,
/// a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use docsync::config::loader::load_config;
///
/// let config = load_config("docsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Applies the same substitution, overrides and validation as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<SyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported
/// together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_var(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_env<T: std::str::FromStr>(section: &str, key: &str) -> Result<Option<T>> {
    match env_var(section, key) {
        Some(val) => val.parse().map(Some).map_err(|_| {
            SyncError::Configuration(format!(
                "Invalid value '{val}' for {ENV_PREFIX}_{section}_{key}"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the DOCSYNC_* prefix
///
/// Environment variables follow the pattern: DOCSYNC_<SECTION>_<KEY>
/// For example: DOCSYNC_COSMOSDB_ENDPOINT, DOCSYNC_SCHEDULE_DAILY_AT
fn apply_env_overrides(config: &mut SyncConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parse_env("APPLICATION", "DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Cosmos DB overrides
    if let Some(val) = env_var("COSMOSDB", "ENDPOINT") {
        config.cosmosdb.endpoint = val;
    }
    if let Some(val) = env_var("COSMOSDB", "KEY") {
        config.cosmosdb.key = secret_string(val);
    }
    if let Some(val) = env_var("COSMOSDB", "DATABASE_NAME") {
        config.cosmosdb.database_name = val;
    }
    if let Some(val) = parse_env("COSMOSDB", "THROUGHPUT")? {
        config.cosmosdb.throughput = Some(val);
    }
    if let Some(val) = env_var("COSMOSDB", "PROCEDURE_NAME") {
        config.cosmosdb.procedure_name = val;
    }
    if let Some(val) = parse_env("COSMOSDB", "REQUEST_TIMEOUT_SECONDS")? {
        config.cosmosdb.request_timeout_seconds = val;
    }

    // Import job overrides
    if let Some(val) = parse_env("CONTROLS", "ENABLED")? {
        config.controls.enabled = val;
    }
    if let Some(val) = env_var("CONTROLS", "COLLECTION") {
        config.controls.collection = val;
    }
    if let Some(val) = parse_env("CUSTOMERS", "ENABLED")? {
        config.customers.enabled = val;
    }
    if let Some(val) = env_var("CUSTOMERS", "COLLECTION") {
        config.customers.collection = val;
    }
    if let Some(val) = env_var("CUSTOMERS", "SOURCE_URL") {
        config.customers.source_url = Some(val);
    }
    if let Some(val) = env_var("CUSTOMERS", "API_KEY") {
        config.customers.api_key = secret_string_opt(Some(val));
    }
    if let Some(val) = parse_env("CUSTOMERS", "TIMEOUT_SECONDS")? {
        config.customers.timeout_seconds = val;
    }

    // Schedule overrides
    if let Some(val) = env_var("SCHEDULE", "DAILY_AT") {
        config.schedule.daily_at = val;
    }
    if let Some(val) = parse_env("SCHEDULE", "PAST_DUE_GRACE_SECONDS")? {
        config.schedule.past_due_grace_seconds = val;
    }

    // Logging overrides
    if let Some(val) = parse_env("LOGGING", "LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
