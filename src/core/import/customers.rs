//! Customer source
//!
//! Fetches customer records from an upstream HTTP endpoint returning a JSON
//! array of [`Customer`] objects.

use crate::config::CustomersConfig;
use crate::domain::{Customer, Result, SyncError};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// HTTP source of customer records
pub struct CustomerSource {
    client: Client,
    url: String,
    bearer: Option<String>,
}

impl CustomerSource {
    /// Build a source from the `[customers]` section
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Configuration` if no source URL is configured.
    pub fn from_config(config: &CustomersConfig) -> Result<Self> {
        let url = config.source_url.clone().ok_or_else(|| {
            SyncError::Configuration("customers.source_url is not set".to_string())
        })?;
        let bearer = config
            .api_key
            .as_ref()
            .map(|key| String::from(key.expose_secret().clone()));

        Self::new(url, bearer, Duration::from_secs(config.timeout_seconds))
    }

    pub fn new(url: impl Into<String>, bearer: Option<String>, timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::Import(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            bearer,
        })
    }

    /// Fetch every customer record from the source
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Import` on transport failure, a non-success
    /// status, or a body that is not an array of customer records.
    pub async fn fetch(&self) -> Result<Vec<Customer>> {
        let mut request = self
            .client
            .get(&self.url)
            .header("Accept", "application/json");
        if let Some(token) = &self.bearer {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let resp = request.send().await.map_err(|e| {
            SyncError::Import(format!("Customer source request failed: {e}"))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Import(format!(
                "Customer source returned status {status}: {body}"
            )));
        }

        let customers = resp.json::<Vec<Customer>>().await.map_err(|e| {
            SyncError::Import(format!("Customer source returned an invalid body: {e}"))
        })?;

        tracing::debug!(url = %self.url, count = customers.len(), "Fetched customers");
        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CustomerStatus;
    use mockito::Matcher;

    const BODY: &str = r#"[
        {"id": "c-1", "name": "Contoso", "email": "ops@contoso.example", "status": "Active", "tier": "gold", "updatedAt": "2024-03-01T12:30:00Z"},
        {"id": "c-2", "name": "Fabrikam", "status": "Closed", "updatedAt": "2024-02-11T08:00:00Z"}
    ]"#;

    #[tokio::test]
    async fn test_fetch_parses_customers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/customers")
            .match_header("authorization", "Bearer token-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let source = CustomerSource::new(
            format!("{}/customers", server.url()),
            Some("token-123".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        let customers = source.fetch().await.unwrap();
        mock.assert_async().await;

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].tier.as_deref(), Some("gold"));
        assert_eq!(customers[1].status, CustomerStatus::Closed);
        assert!(customers[1].email.is_none());
    }

    #[tokio::test]
    async fn test_no_authorization_without_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/customers")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let source =
            CustomerSource::new(format!("{}/customers", server.url()), None, Duration::from_secs(5))
                .unwrap();

        assert!(source.fetch().await.unwrap().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_import_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customers")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let source =
            CustomerSource::new(format!("{}/customers", server.url()), None, Duration::from_secs(5))
                .unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SyncError::Import(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_invalid_body_is_import_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customers")
            .with_status(200)
            .with_body(r#"{"customers": []}"#)
            .create_async()
            .await;

        let source =
            CustomerSource::new(format!("{}/customers", server.url()), None, Duration::from_secs(5))
                .unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("invalid body"));
    }

    #[test]
    fn test_from_config_requires_url() {
        let config = CustomersConfig::default();
        assert!(matches!(
            CustomerSource::from_config(&config),
            Err(SyncError::Configuration(_))
        ));
    }
}
