//! Entity contract for repository-managed records

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Application record stored by a [`DocumentRepository`](crate::repository::DocumentRepository)
///
/// Entities are opaque to the repository apart from their identifier, which
/// must be unique within the entity's collection and serialized as the `id`
/// property. `KIND` names the entity type; it is written to every stored
/// document as the partition value, so all documents of one type share a
/// logical partition.
///
/// Entities must not declare a `docType` field of their own.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Entity type name used as the partition value
    const KIND: &'static str;

    /// Collection-unique identifier
    fn id(&self) -> &str;
}
