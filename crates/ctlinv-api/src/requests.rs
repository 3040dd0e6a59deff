//! Query types for the API

use serde::{Deserialize, Serialize};

/// Name-filtered lookup against `/api/v2/inventories/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLookup {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl InventoryLookup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            organization: None,
        }
    }

    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Query string pairs, unencoded
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("name", self.name.as_str())];
        if let Some(org) = &self.organization {
            pairs.push(("organization__name", org.as_str()));
        }
        pairs
    }
}

/// Flags sent to `/api/v2/inventories/<id>/script/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptQuery {
    pub hostvars: bool,
    pub controllervars: bool,
    pub all: bool,
}

impl Default for ScriptQuery {
    fn default() -> Self {
        Self {
            hostvars: true,
            controllervars: true,
            all: true,
        }
    }
}

impl ScriptQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let flag = |on: bool| if on { "1" } else { "0" };
        vec![
            ("hostvars", flag(self.hostvars)),
            ("controllervars", flag(self.controllervars)),
            ("all", flag(self.all)),
        ]
    }
}
