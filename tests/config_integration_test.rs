//! Integration tests for configuration loading and validation
//!
//! Tests that touch `DOCSYNC_*` variables hold `ENV_MUTEX` so overrides do
//! not leak between tests running in parallel.

use docsync::config::load_config;
use docsync::domain::SyncError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDE_VARS: &[&str] = &[
    "DOCSYNC_APPLICATION_LOG_LEVEL",
    "DOCSYNC_APPLICATION_DRY_RUN",
    "DOCSYNC_COSMOSDB_DATABASE_NAME",
    "DOCSYNC_COSMOSDB_THROUGHPUT",
    "DOCSYNC_CUSTOMERS_ENABLED",
    "DOCSYNC_CUSTOMERS_SOURCE_URL",
    "DOCSYNC_SCHEDULE_DAILY_AT",
    "DOCSYNC_IT_COSMOS_KEY",
    "DOCSYNC_IT_CRM_TOKEN",
];

fn cleanup_env_vars() {
    for var in OVERRIDE_VARS {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MINIMAL: &str = r#"
[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "dGVzdC1rZXk="
database_name = "catalog-db"
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("DOCSYNC_IT_COSMOS_KEY", "c2VjcmV0LWtleQ==");
    std::env::set_var("DOCSYNC_IT_CRM_TOKEN", "crm-token");

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "${DOCSYNC_IT_COSMOS_KEY}"
database_name = "catalog-db"
throughput = 800
procedure_name = "BulkImport"
request_timeout_seconds = 45

[controls]
enabled = true
collection = "controls"

[customers]
enabled = true
collection = "customers"
source_url = "https://crm.example.com/api/customers"
api_key = "${DOCSYNC_IT_CRM_TOKEN}"
timeout_seconds = 20

[schedule]
daily_at = "03:30"
past_due_grace_seconds = 600

[logging]
local_enabled = false
local_path = "/tmp/docsync-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    cleanup_env_vars();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.cosmosdb.key.expose_secret().as_ref(), "c2VjcmV0LWtleQ==");
    assert_eq!(config.cosmosdb.throughput, Some(800));
    assert_eq!(config.cosmosdb.request_timeout_seconds, 45);
    assert!(config.customers.enabled);
    assert_eq!(
        config
            .customers
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().as_ref().to_string()),
        Some("crm-token".to_string())
    );
    assert_eq!(config.schedule.daily_at, "03:30");
    assert_eq!(config.schedule.past_due_grace_seconds, 600);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_defaults_applied() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(MINIMAL);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.cosmosdb.throughput, Some(400));
    assert_eq!(config.cosmosdb.procedure_name, "BulkImport");
    assert!(config.controls.enabled);
    assert_eq!(config.controls.collection, "controls");
    assert!(!config.customers.enabled);
    assert_eq!(config.schedule.daily_at, "02:00");
    assert_eq!(config.logging.local_rotation, "daily");
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("DOCSYNC_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("DOCSYNC_APPLICATION_DRY_RUN", "true");
    std::env::set_var("DOCSYNC_COSMOSDB_DATABASE_NAME", "override-db");
    std::env::set_var("DOCSYNC_COSMOSDB_THROUGHPUT", "1200");
    std::env::set_var("DOCSYNC_CUSTOMERS_ENABLED", "true");
    std::env::set_var(
        "DOCSYNC_CUSTOMERS_SOURCE_URL",
        "https://crm.example.com/customers",
    );
    std::env::set_var("DOCSYNC_SCHEDULE_DAILY_AT", "23:15");

    let file = write_config(MINIMAL);
    let result = load_config(file.path());
    cleanup_env_vars();
    let config = result.unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert!(config.application.dry_run);
    assert_eq!(config.cosmosdb.database_name, "override-db");
    assert_eq!(config.cosmosdb.throughput, Some(1200));
    assert!(config.customers.enabled);
    assert_eq!(
        config.customers.source_url.as_deref(),
        Some("https://crm.example.com/customers")
    );
    assert_eq!(config.schedule.daily_at, "23:15");
}

#[test]
fn test_invalid_override_is_config_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("DOCSYNC_COSMOSDB_THROUGHPUT", "lots");

    let file = write_config(MINIMAL);
    let result = load_config(file.path());
    cleanup_env_vars();

    assert!(matches!(result, Err(SyncError::Configuration(_))));
}

#[test]
fn test_missing_substitution_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "${DOCSYNC_IT_COSMOS_KEY}"
database_name = "catalog-db"
"#,
    );

    match load_config(file.path()) {
        Err(SyncError::Configuration(message)) => {
            assert!(message.contains("DOCSYNC_IT_COSMOS_KEY"))
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_validation_failures() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let low_throughput = write_config(&format!("{MINIMAL}throughput = 300\n"));
    assert!(load_config(low_throughput.path()).is_err());

    let shared_collection = write_config(&format!(
        r#"{MINIMAL}
[customers]
enabled = true
collection = "controls"
source_url = "https://crm.example.com/customers"
"#
    ));
    let err = load_config(shared_collection.path()).unwrap_err();
    assert!(err.to_string().contains("must differ"));

    let customers_without_source = write_config(&format!(
        r#"{MINIMAL}
[customers]
enabled = true
"#
    ));
    assert!(load_config(customers_without_source.path()).is_err());

    let bad_schedule = write_config(&format!(
        r#"{MINIMAL}
[schedule]
daily_at = "25:00"
"#
    ));
    assert!(load_config(bad_schedule.path()).is_err());
}

#[test]
fn test_missing_file() {
    let result = load_config("/nonexistent/docsync.toml");
    assert!(matches!(result, Err(SyncError::Configuration(_))));
}
