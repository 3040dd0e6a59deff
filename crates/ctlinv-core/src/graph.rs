//! Owned inventory graph
//!
//! Groups and hosts are keyed by name. Only the builder mutates a graph;
//! callers receive it read-only.

use std::collections::{BTreeMap, BTreeSet};

use ctlinv_api::script::{ROOT_GROUP, Vars};
use serde_json::Value;

use crate::error::{InventoryError, Result};

/// A group with its own vars, member hosts and child groups
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    name: String,
    vars: Vars,
    hosts: BTreeSet<String>,
    children: BTreeSet<String>,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vars: Vars::new(),
            hosts: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// Direct member hosts
    pub fn hosts(&self) -> &BTreeSet<String> {
        &self.hosts
    }

    /// Direct child groups
    pub fn children(&self) -> &BTreeSet<String> {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    name: String,
    vars: Vars,
}

impl Host {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }
}

/// Hosts, groups and the membership edges between them
///
/// The root group always exists.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryGraph {
    groups: BTreeMap<String, Group>,
    hosts: BTreeMap<String, Host>,
}

impl Default for InventoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryGraph {
    pub fn new() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(ROOT_GROUP.to_string(), Group::new(ROOT_GROUP));
        Self {
            groups,
            hosts: BTreeMap::new(),
        }
    }

    pub fn groups(&self) -> &BTreeMap<String, Group> {
        &self.groups
    }

    pub fn hosts(&self) -> &BTreeMap<String, Host> {
        &self.hosts
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.get(name)
    }

    /// Variables of a single host
    pub fn host_vars(&self, name: &str) -> Option<&Vars> {
        self.hosts.get(name).map(Host::vars)
    }

    pub fn root(&self) -> &Group {
        // Inserted by `new` and never removed.
        &self.groups[ROOT_GROUP]
    }

    pub(crate) fn add_group(&mut self, name: &str) {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| Group::new(name));
    }

    pub(crate) fn add_host(&mut self, name: &str) {
        self.hosts.entry(name.to_string()).or_insert_with(|| Host {
            name: name.to_string(),
            vars: Vars::new(),
        });
    }

    pub(crate) fn set_host_var(&mut self, host: &str, key: &str, value: Value) {
        if let Some(host) = self.hosts.get_mut(host) {
            host.vars.insert(key.to_string(), value);
        }
    }

    pub(crate) fn set_group_var(&mut self, group: &str, key: &str, value: Value) {
        if let Some(group) = self.groups.get_mut(group) {
            group.vars.insert(key.to_string(), value);
        }
    }

    /// Attach an existing host to an existing group
    pub(crate) fn add_member(&mut self, group: &str, host: &str) {
        if !self.hosts.contains_key(host) {
            return;
        }
        if let Some(group) = self.groups.get_mut(group) {
            group.hosts.insert(host.to_string());
        }
    }

    /// Link two existing groups
    ///
    /// # Errors
    /// Returns `InventoryError::Parse` if the group is its own child or the
    /// link would close a loop of child groups.
    pub(crate) fn add_child(&mut self, parent: &str, child: &str) -> Result<()> {
        if parent == child {
            return Err(InventoryError::Parse(format!(
                "group {parent} cannot be a child of itself"
            )));
        }
        if !self.groups.contains_key(child) || !self.groups.contains_key(parent) {
            return Ok(());
        }
        if self.descends_from(parent, child) {
            return Err(InventoryError::Parse(format!(
                "adding group {child} as child to {parent} creates a recursive dependency loop"
            )));
        }
        if let Some(group) = self.groups.get_mut(parent) {
            group.children.insert(child.to_string());
        }
        Ok(())
    }

    /// Whether `group` is reachable from `ancestor` through child links
    fn descends_from(&self, group: &str, ancestor: &str) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![ancestor];
        while let Some(name) = stack.pop() {
            if name == group {
                return true;
            }
            if !seen.insert(name) {
                continue;
            }
            if let Some(current) = self.groups.get(name) {
                stack.extend(current.children.iter().map(String::as_str));
            }
        }
        false
    }

    /// Normalise implicit memberships
    ///
    /// Groups without a parent become children of the root group, and
    /// hosts that belong to no group are attached to it directly.
    pub(crate) fn reconcile(&mut self) {
        let parented: BTreeSet<&String> = self
            .groups
            .values()
            .flat_map(|g| g.children.iter())
            .collect();
        let orphans: Vec<String> = self
            .groups
            .keys()
            .filter(|name| name.as_str() != ROOT_GROUP && !parented.contains(name))
            .cloned()
            .collect();

        let grouped: BTreeSet<&String> =
            self.groups.values().flat_map(|g| g.hosts.iter()).collect();
        let ungrouped: Vec<String> = self
            .hosts
            .keys()
            .filter(|name| !grouped.contains(name))
            .cloned()
            .collect();

        let root = self
            .groups
            .entry(ROOT_GROUP.to_string())
            .or_insert_with(|| Group::new(ROOT_GROUP));
        root.children.extend(orphans);
        root.hosts.extend(ungrouped);
    }

}
