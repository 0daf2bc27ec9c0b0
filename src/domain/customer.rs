//! Customer record entity

use super::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account status of a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerStatus {
    Active,
    Suspended,
    Closed,
}

/// Customer record pulled from the upstream customer API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Upstream customer identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Primary contact address
    #[serde(default)]
    pub email: Option<String>,

    /// Account status
    pub status: CustomerStatus,

    /// Subscription tier, if any
    #[serde(default)]
    pub tier: Option<String>,

    /// Last modification time in the upstream system
    pub updated_at: DateTime<Utc>,
}

impl Entity for Customer {
    const KIND: &'static str = "customer";

    fn id(&self) -> &str {
        &self.id
    }
}
