//! Control catalog source
//!
//! The catalog ships inside the binary as CSV with a header row:
//! `id,domain,name,description,level,tags`. Tags are `;`-separated and an
//! empty description is treated as absent.

use crate::domain::{ControlLevel, Result, SecurityControl, SyncError};
use serde::Deserialize;
use std::io::Read;

/// Control catalog embedded at build time
pub const EMBEDDED_CATALOG: &str = include_str!("../../../resources/controls.csv");

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    domain: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    level: ControlLevel,
    #[serde(default)]
    tags: String,
}

impl CatalogRow {
    fn into_control(self) -> SecurityControl {
        SecurityControl {
            id: self.id.trim().to_string(),
            domain: self.domain.trim().to_string(),
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            level: self.level,
            tags: self
                .tags
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Parse the embedded control catalog
pub fn load_embedded() -> Result<Vec<SecurityControl>> {
    parse_catalog(EMBEDDED_CATALOG.as_bytes())
}

/// Parse a control catalog from CSV
///
/// # Errors
///
/// Returns `SyncError::Import` for malformed rows, unknown levels, empty ids
/// or duplicate ids. The error names the offending record.
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<SecurityControl>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut controls: Vec<SecurityControl> = Vec::new();
    for (index, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        let record = index + 1;
        let control = row
            .map_err(|e| SyncError::Import(format!("Catalog record {record}: {e}")))?
            .into_control();

        if control.id.is_empty() {
            return Err(SyncError::Import(format!(
                "Catalog record {record}: empty id"
            )));
        }
        if controls.iter().any(|c| c.id == control.id) {
            return Err(SyncError::Import(format!(
                "Catalog record {record}: duplicate id '{}'",
                control.id
            )));
        }
        controls.push(control);
    }

    tracing::debug!(count = controls.len(), "Parsed control catalog");
    Ok(controls)
}
