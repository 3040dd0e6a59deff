//! Controller metadata attached to the root group

use ctlinv_api::responses::ServerConfig;
use ctlinv_api::script::ROOT_GROUP;
use serde_json::{Value, json};

use crate::graph::InventoryGraph;

/// Root-group variable holding the server description
pub const METADATA_VAR: &str = "controller_metadata";

const UNKNOWN: &str = "unknown";

/// `{license_type, version, ansible_version}` with `"unknown"` for
/// anything the server left out
pub fn controller_metadata(config: &ServerConfig) -> Value {
    let or_unknown = |value: Option<&Value>| value.cloned().unwrap_or_else(|| json!(UNKNOWN));
    let license_type = config
        .license_info
        .as_ref()
        .and_then(|info| info.license_type.as_ref());

    json!({
        "license_type": or_unknown(license_type),
        "version": or_unknown(config.version.as_ref()),
        "ansible_version": or_unknown(config.ansible_version.as_ref()),
    })
}

pub(crate) fn augment(graph: &mut InventoryGraph, config: &ServerConfig) {
    graph.set_group_var(ROOT_GROUP, METADATA_VAR, controller_metadata(config));
}
