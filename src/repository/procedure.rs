//! Bulk import stored procedure
//!
//! The procedure body ships inside the binary and is registered per
//! collection by the [`Provisioner`](super::Provisioner). It takes one
//! argument, the array of documents, and answers with the number of
//! documents it upserted before the server-side execution budget ran out.

use crate::domain::StoreError;
use serde::Deserialize;
use serde_json::Value;

/// Name the procedure is registered under unless configured otherwise
pub const DEFAULT_PROCEDURE_NAME: &str = "BulkImport";

/// JavaScript body of the bulk import procedure
pub const BULK_IMPORT_BODY: &str = include_str!("../../resources/bulk_import.js");

/// Response body of one procedure invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BulkImportResponse {
    /// Documents completed, counted from the start of the submitted batch
    pub count: usize,
}

impl BulkImportResponse {
    /// Parse a procedure response body
    ///
    /// Older deployments of the procedure answered with a bare number.
    pub fn parse(body: Value) -> Result<Self, StoreError> {
        match body {
            Value::Number(n) => n
                .as_u64()
                .map(|count| Self {
                    count: count as usize,
                })
                .ok_or_else(|| StoreError::InvalidResponse(format!("Invalid count: {n}"))),
            other => serde_json::from_value(other).map_err(|e| {
                StoreError::InvalidResponse(format!("Malformed bulk import response: {e}"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_is_embedded() {
        assert!(BULK_IMPORT_BODY.contains("function bulkImport(docs)"));
        assert!(BULK_IMPORT_BODY.contains("upsertDocument"));
    }

    #[test]
    fn test_parse_object_response() {
        let response = BulkImportResponse::parse(json!({"count": 7})).unwrap();
        assert_eq!(response.count, 7);
    }

    #[test]
    fn test_parse_bare_number() {
        let response = BulkImportResponse::parse(json!(3)).unwrap();
        assert_eq!(response.count, 3);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(BulkImportResponse::parse(json!("done")).is_err());
        assert!(BulkImportResponse::parse(json!(-1)).is_err());
    }
}
