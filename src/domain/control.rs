//! Security control catalog entity

use super::entity::Entity;
use serde::{Deserialize, Serialize};

/// Maturity level a control belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlLevel {
    Basic,
    Standard,
    Advanced,
}

/// Entry of the security-control catalog
///
/// The catalog ships as an embedded CSV resource; see
/// [`core::import::catalog`](crate::core::import::catalog).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityControl {
    /// Control number, e.g. `1.1`
    pub id: String,

    /// Control family, e.g. `Identity`
    pub domain: String,

    /// Short control name
    pub name: String,

    /// Control statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Maturity level
    pub level: ControlLevel,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Entity for SecurityControl {
    const KIND: &'static str = "securityControl";

    fn id(&self) -> &str {
        &self.id
    }
}
