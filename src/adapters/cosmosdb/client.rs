//! Connection provider
//!
//! Owns the lazily constructed store client shared by every repository in
//! the process. Construct one provider, wrap it in an `Arc`, and hand clones
//! to the repositories that should share it.

use crate::adapters::cosmosdb::codec::DocumentCodec;
use crate::adapters::cosmosdb::store::CosmosStore;
use crate::adapters::database::DocumentStore;
use crate::config::CosmosDbConfig;
use crate::domain::{Result, SyncError};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily initialised, shared document store handle
///
/// The first call to [`client`](Self::client) builds the store from the
/// configured endpoint and key. Concurrent first callers wait on the same
/// initialisation and all observe the same instance.
pub struct ConnectionProvider {
    config: Option<CosmosDbConfig>,
    store: OnceCell<Arc<dyn DocumentStore>>,
    codec: DocumentCodec,
}

impl ConnectionProvider {
    /// Create a provider that connects to Cosmos DB on first use
    pub fn new(config: CosmosDbConfig) -> Self {
        Self {
            config: Some(config),
            store: OnceCell::new(),
            codec: DocumentCodec::default(),
        }
    }

    /// Create a provider around an already constructed store
    ///
    /// Used for the in-memory store and for tests.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: None,
            store: OnceCell::new_with(Some(store)),
            codec: DocumentCodec::default(),
        }
    }

    /// Replace the serialization policy
    pub fn with_codec(mut self, codec: DocumentCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Get the shared store client, constructing it on first use
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Connection` if the endpoint or key is invalid.
    /// A failed attempt is not cached; the next call retries.
    pub async fn client(&self) -> Result<Arc<dyn DocumentStore>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                let config = self.config.as_ref().ok_or_else(|| {
                    SyncError::Connection("No store configured for provider".to_string())
                })?;

                tracing::debug!(endpoint = %config.endpoint, "Initialising document store client");
                let store = CosmosStore::connect(config)?;
                Ok::<Arc<dyn DocumentStore>, SyncError>(Arc::new(store))
            })
            .await?;

        Ok(Arc::clone(store))
    }

    /// Serialization policy applied by repositories using this provider
    pub fn codec(&self) -> &DocumentCodec {
        &self.codec
    }

    /// Whether the client has been constructed yet
    pub fn is_initialized(&self) -> bool {
        self.store.initialized()
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field(
                "endpoint",
                &self.config.as_ref().map(|c| c.endpoint.as_str()),
            )
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
