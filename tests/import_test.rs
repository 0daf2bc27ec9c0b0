//! End-to-end import tests
//!
//! Customer records are served by a mock HTTP source and written to the
//! in-memory store through the same coordinator the CLI uses.

use docsync::adapters::cosmosdb::ConnectionProvider;
use docsync::adapters::memory::MemoryStore;
use docsync::config::{parse_config, SyncConfig};
use docsync::core::import::{ImportCoordinator, ImportJob, JobStatus};
use docsync::domain::CustomerStatus;
use docsync::repository::Field;
use std::sync::Arc;

const CUSTOMERS: &str = r#"[
    {"id": "c-3", "name": "Northwind", "status": "Active", "updatedAt": "2024-04-02T09:00:00Z"},
    {"id": "c-1", "name": "Contoso", "email": "ops@contoso.example", "status": "Active", "tier": "gold", "updatedAt": "2024-03-01T12:30:00Z"},
    {"id": "c-2", "name": "Fabrikam", "status": "Suspended", "updatedAt": "2024-02-11T08:00:00Z"}
]"#;

fn config(source_url: &str) -> SyncConfig {
    parse_config(&format!(
        r#"
[cosmosdb]
endpoint = "https://test.documents.azure.com:443/"
key = "dGVzdC1rZXk="
database_name = "catalog-db"

[customers]
enabled = true
collection = "customers"
source_url = "{source_url}"
api_key = "crm-token"
timeout_seconds = 5
"#
    ))
    .unwrap()
}

fn coordinator(store: &Arc<MemoryStore>, config: SyncConfig) -> ImportCoordinator {
    let provider = Arc::new(ConnectionProvider::with_store(store.clone()));
    ImportCoordinator::new(config, provider)
}

#[tokio::test]
async fn test_customers_imported_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/customers")
        .match_header("authorization", "Bearer crm-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CUSTOMERS)
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new().with_procedure_budget(2));
    let coordinator = coordinator(&store, config(&format!("{}/api/customers", server.url())));

    let summary = coordinator.run_enabled().await;
    mock.assert_async().await;

    assert!(summary.is_successful());
    let report = summary.job(ImportJob::Customers).unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.imported, 3);
    assert_eq!(report.invocations, 2);

    let customers = coordinator.customers();
    let active = customers
        .query(&Field::new("status").eq("Active"))
        .await
        .unwrap();
    let ids: Vec<&str> = active.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c-1", "c-3"]);

    let contoso = customers.get("c-1").await.unwrap().unwrap();
    assert_eq!(contoso.tier.as_deref(), Some("gold"));
    assert_eq!(
        customers.get("c-2").await.unwrap().unwrap().status,
        CustomerStatus::Suspended
    );

    let controls = coordinator.controls().get_all().await.unwrap();
    assert_eq!(
        controls.len(),
        summary.job(ImportJob::Controls).unwrap().fetched
    );
}

#[tokio::test]
async fn test_source_failure_reported_per_job() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/customers")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(&store, config(&format!("{}/api/customers", server.url())));

    let summary = coordinator.run_enabled().await;

    assert_eq!(summary.failed_jobs(), 1);
    match &summary.job(ImportJob::Customers).unwrap().status {
        JobStatus::Failed(message) => assert!(message.contains("500")),
        other => panic!("expected failed job, got {other:?}"),
    }
    assert_eq!(
        summary.job(ImportJob::Controls).unwrap().status,
        JobStatus::Succeeded
    );
    assert_eq!(store.document_count("catalog-db", "customers").await, 0);
}

#[tokio::test]
async fn test_reimport_overwrites_instead_of_duplicating() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/customers")
        .with_status(200)
        .with_body(CUSTOMERS)
        .expect(2)
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(&store, config(&format!("{}/api/customers", server.url())));

    coordinator.run(&[ImportJob::Customers]).await;
    coordinator.run(&[ImportJob::Customers]).await;

    assert_eq!(store.document_count("catalog-db", "customers").await, 3);
}

#[tokio::test]
async fn test_provision_creates_each_enabled_collection() {
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(&store, config("https://crm.example.com/api/customers"));

    let outcomes = coordinator.provision().await.unwrap();
    let jobs: Vec<ImportJob> = outcomes.iter().map(|(job, _)| *job).collect();
    assert_eq!(jobs, vec![ImportJob::Controls, ImportJob::Customers]);
    assert!(outcomes[0].1.database_created);
    assert!(!outcomes[1].1.database_created);
    assert!(outcomes[1].1.collection_created);

    assert!(store
        .procedure_body("catalog-db", "customers", "BulkImport")
        .await
        .is_some());
}
