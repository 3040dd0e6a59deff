//! Renderers for a finished inventory graph

use std::fmt::Write as _;

use ctlinv_api::script::{META_KEY, ROOT_GROUP};
use serde_json::{Map, Value, json};

use crate::graph::InventoryGraph;

impl InventoryGraph {
    /// Standard dynamic-inventory JSON
    ///
    /// Every group gets an entry; empty `hosts`, `children` and `vars`
    /// keys are left out. Per-host variables go under `_meta.hostvars`.
    pub fn to_ansible_json(&self) -> Value {
        let mut out = Map::new();

        for (name, group) in self.groups() {
            let mut entry = Map::new();
            if !group.hosts().is_empty() {
                entry.insert("hosts".into(), json!(group.hosts()));
            }
            if !group.children().is_empty() {
                entry.insert("children".into(), json!(group.children()));
            }
            if !group.vars().is_empty() {
                entry.insert("vars".into(), Value::Object(group.vars().clone()));
            }
            out.insert(name.clone(), Value::Object(entry));
        }

        let hostvars: Map<String, Value> = self
            .hosts()
            .iter()
            .map(|(name, host)| (name.clone(), Value::Object(host.vars().clone())))
            .collect();
        out.insert(META_KEY.into(), json!({ "hostvars": hostvars }));

        Value::Object(out)
    }

    /// Indented tree of groups and hosts, starting at the root group
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_group(ROOT_GROUP, 0, &mut out);
        out
    }

    // Child links never form a loop, so the recursion terminates.
    fn render_group(&self, name: &str, depth: usize, out: &mut String) {
        let Some(group) = self.group(name) else {
            return;
        };

        let _ = writeln!(out, "{}", tree_line(&format!("@{name}:"), depth));
        for child in group.children() {
            self.render_group(child, depth + 1, out);
        }
        for host in group.hosts() {
            let _ = writeln!(out, "{}", tree_line(host, depth + 1));
        }
    }
}

fn tree_line(label: &str, depth: usize) -> String {
    if depth == 0 {
        label.to_string()
    } else {
        format!("{}--{label}", "  |".repeat(depth))
    }
}
