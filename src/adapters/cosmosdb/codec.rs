//! Document serialization policy
//!
//! The codec is the typed boundary between entities and stored documents.
//! Encoding applies the wire policy (enum values by name, UTC RFC 3339
//! timestamps, null members omitted) and stamps the partition value;
//! decoding strips store-managed properties and performs a schema-checked
//! deserialization into the concrete entity type.
//!
//! Enum naming and timestamp format come from the entities' serde derives
//! (`chrono::DateTime<Utc>` serializes as RFC 3339 in UTC). Entities are owned
//! trees, so serialization cannot encounter reference cycles.

use crate::domain::{Entity, Result, SyncError};
use serde_json::{Map, Value};

/// Property every stored document carries its entity kind in
pub const PARTITION_KEY_FIELD: &str = "docType";

/// Partition key path collections are created with
pub const PARTITION_KEY_PATH: &str = "/docType";

/// Properties the store adds to every document
const SYSTEM_PROPERTIES: [&str; 5] = ["_rid", "_self", "_etag", "_attachments", "_ts"];

/// Entity <-> document codec
#[derive(Debug, Clone)]
pub struct DocumentCodec {
    omit_nulls: bool,
}

impl Default for DocumentCodec {
    fn default() -> Self {
        Self { omit_nulls: true }
    }
}

impl DocumentCodec {
    /// Create the codec with the standard wire policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize an entity into a storable document
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Serialization` if the entity does not serialize to
    /// a JSON object whose `id` matches [`Entity::id`].
    pub fn encode<T: Entity>(&self, item: &T) -> Result<Value> {
        let value = serde_json::to_value(item).map_err(|e| {
            SyncError::Serialization(format!("Failed to encode {} document: {e}", T::KIND))
        })?;

        let Value::Object(mut members) = value else {
            return Err(SyncError::Serialization(format!(
                "{} must serialize to a JSON object",
                T::KIND
            )));
        };

        let id = item.id();
        if id.is_empty() {
            return Err(SyncError::Serialization(format!(
                "{} document has an empty id",
                T::KIND
            )));
        }
        if members.get("id").and_then(Value::as_str) != Some(id) {
            return Err(SyncError::Serialization(format!(
                "{} document must serialize its identifier as 'id'",
                T::KIND
            )));
        }

        if self.omit_nulls {
            strip_nulls(&mut members);
        }
        members.insert(
            PARTITION_KEY_FIELD.to_string(),
            Value::String(T::KIND.to_string()),
        );

        Ok(Value::Object(members))
    }

    /// Deserialize a stored document into an entity
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Serialization` if the document does not match the
    /// entity's schema.
    pub fn decode<T: Entity>(&self, document: Value) -> Result<T> {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<missing id>")
            .to_string();

        let document = match document {
            Value::Object(mut members) => {
                for property in SYSTEM_PROPERTIES {
                    members.remove(property);
                }
                members.remove(PARTITION_KEY_FIELD);
                Value::Object(members)
            }
            other => other,
        };

        serde_json::from_value(document).map_err(|e| {
            SyncError::Serialization(format!(
                "Failed to decode {} document '{id}': {e}",
                T::KIND
            ))
        })
    }
}

fn strip_nulls(members: &mut Map<String, Value>) {
    members.retain(|_, value| !value.is_null());
    for value in members.values_mut() {
        strip_nested(value);
    }
}

fn strip_nested(value: &mut Value) {
    match value {
        Value::Object(members) => strip_nulls(members),
        Value::Array(items) => items.iter_mut().for_each(strip_nested),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Customer, CustomerStatus};
    use chrono::{FixedOffset, TimeZone, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    fn customer() -> Customer {
        Customer {
            id: "c-42".to_string(),
            name: "Fabrikam".to_string(),
            email: None,
            status: CustomerStatus::Active,
            tier: None,
            updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_encode_applies_policy() {
        let doc = DocumentCodec::new().encode(&customer()).unwrap();

        assert_eq!(doc["docType"], "customer");
        assert_eq!(doc["status"], "Active");
        assert_eq!(doc["updatedAt"], "2024-06-01T08:00:00Z");
        assert!(doc.get("email").is_none());
        assert!(doc.get("tier").is_none());
    }

    #[test]
    fn test_offset_timestamps_normalized_to_utc() {
        let local = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 10, 0, 0)
            .unwrap();
        let mut record = customer();
        record.updated_at = local.with_timezone(&Utc);

        let doc = DocumentCodec::new().encode(&record).unwrap();
        assert_eq!(doc["updatedAt"], "2024-06-01T08:00:00Z");
    }

    #[test]
    fn test_decode_round_trip_with_system_properties() {
        let codec = DocumentCodec::new();
        let mut doc = codec.encode(&customer()).unwrap();
        doc["_etag"] = json!("\"0000\"");
        doc["_ts"] = json!(1717228800);

        let decoded: Customer = codec.decode(doc).unwrap();
        assert_eq!(decoded, customer());
    }

    #[test]
    fn test_decode_schema_mismatch() {
        let err = DocumentCodec::new()
            .decode::<Customer>(json!({"id": "c-1", "name": "x", "status": "Unknown"}))
            .unwrap_err();

        assert!(matches!(err, SyncError::Serialization(_)));
        assert!(err.to_string().contains("customer document 'c-1'"));
    }

    #[test]
    fn test_nested_nulls_removed() {
        let mut members = json!({"a": null, "b": {"c": null, "d": 1}, "e": [{"f": null}, null]})
            .as_object()
            .cloned()
            .unwrap();
        strip_nulls(&mut members);

        assert_eq!(Value::Object(members), json!({"b": {"d": 1}, "e": [{}, null]}));
    }

    #[derive(Serialize, Deserialize)]
    struct Keyed {
        key: String,
    }

    impl Entity for Keyed {
        const KIND: &'static str = "keyed";

        fn id(&self) -> &str {
            &self.key
        }
    }

    #[test]
    fn test_encode_requires_id_property() {
        let err = DocumentCodec::new()
            .encode(&Keyed {
                key: "k".to_string(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("'id'"));
    }
}
