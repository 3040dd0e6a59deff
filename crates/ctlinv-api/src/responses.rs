//! Response types for the API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single page of `/api/v2/inventories/?name=...`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryList {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<InventorySummary>,
}

impl InventoryList {
    /// Identifier of the first match, if any
    pub fn first_id(&self) -> Option<&Value> {
        self.results.first().map(|r| &r.id)
    }
}

/// Inventory record as returned by the list endpoint
///
/// Only `id` is consumed; it is kept as a raw JSON value since the
/// identifier is spliced back into a URL path verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySummary {
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
}

/// `/api/v2/config/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub license_info: Option<LicenseInfo>,
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub ansible_version: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseInfo {
    #[serde(default)]
    pub license_type: Option<Value>,
}
