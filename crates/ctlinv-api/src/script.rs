//! Inventory script document
//!
//! Shape returned by `/api/v2/inventories/<id>/script/?hostvars=1&all=1`:
//! every top-level key is a group, except the reserved `_meta` entry which
//! carries per-host variables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Variable mapping attached to a host or group
pub type Vars = Map<String, Value>;

/// Name of the reserved metadata entry
pub const META_KEY: &str = "_meta";

/// Name of the implicit root group
pub const ROOT_GROUP: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInventoryDocument {
    #[serde(rename = "_meta", default)]
    pub meta: MetaSection,
    #[serde(flatten)]
    pub groups: BTreeMap<String, RawGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaSection {
    #[serde(default)]
    pub hostvars: BTreeMap<String, Vars>,
}

/// A group entry
///
/// Accepts both the object form and the bare host-list shorthand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGroupRepr")]
pub struct RawGroup {
    pub hosts: Vec<String>,
    pub children: Vec<String>,
    pub vars: Vars,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGroupRepr {
    Hosts(Vec<String>),
    Full {
        #[serde(default)]
        hosts: Vec<String>,
        #[serde(default)]
        children: Vec<String>,
        #[serde(default)]
        vars: Vars,
    },
}

impl From<RawGroupRepr> for RawGroup {
    fn from(repr: RawGroupRepr) -> Self {
        match repr {
            RawGroupRepr::Hosts(hosts) => Self {
                hosts,
                ..Self::default()
            },
            RawGroupRepr::Full {
                hosts,
                children,
                vars,
            } => Self {
                hosts,
                children,
                vars,
            },
        }
    }
}
