//! Three-pass construction of an inventory graph from a raw script document

use std::collections::BTreeSet;

use ctlinv_api::script::{ROOT_GROUP, RawInventoryDocument};
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::filter::FilterSet;
use crate::graph::InventoryGraph;

/// Names that passed admission in the discovery pass
#[derive(Debug, Default)]
struct Admitted<'a> {
    groups: BTreeSet<&'a str>,
    hosts: BTreeSet<&'a str>,
}

/// Builds an [`InventoryGraph`] under a [`FilterSet`]
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'f> {
    filters: &'f FilterSet,
}

impl<'f> GraphBuilder<'f> {
    pub fn new(filters: &'f FilterSet) -> Self {
        Self { filters }
    }

    /// Build and reconcile the graph
    ///
    /// No host or group that failed admission appears in the result,
    /// neither directly nor through a child link.
    ///
    /// # Errors
    /// Returns `InventoryError::Parse` if the admitted groups list each
    /// other as children in a loop.
    #[instrument(skip_all, fields(groups = document.groups.len(), hosts = document.meta.hostvars.len()))]
    pub fn build(&self, document: &RawInventoryDocument) -> Result<InventoryGraph> {
        let mut graph = InventoryGraph::new();

        let admitted = self.discover(document, &mut graph);
        debug!(
            groups = admitted.groups.len(),
            hosts = admitted.hosts.len(),
            "admission pass done"
        );

        self.materialize_hosts(document, &admitted, &mut graph);
        self.link(document, &admitted, &mut graph)?;
        graph.reconcile();
        Ok(graph)
    }

    /// Register admitted groups and collect candidate hosts
    fn discover<'a>(
        &self,
        document: &'a RawInventoryDocument,
        graph: &mut InventoryGraph,
    ) -> Admitted<'a> {
        let mut admitted = Admitted::default();

        for (name, group) in &document.groups {
            if !self.filters.admit_group(name) {
                trace!(group = %name, "group filtered out");
                continue;
            }
            graph.add_group(name);
            admitted.groups.insert(name);

            if !self.filters.admit_hosts_in_group(name) {
                trace!(group = %name, "hosts of group not scanned");
                continue;
            }
            admitted.hosts.extend(
                group
                    .hosts
                    .iter()
                    .map(String::as_str)
                    .filter(|host| self.filters.admit_host(host)),
            );
        }

        admitted
    }

    /// Create admitted hosts that have hostvars, copying vars verbatim
    fn materialize_hosts(
        &self,
        document: &RawInventoryDocument,
        admitted: &Admitted<'_>,
        graph: &mut InventoryGraph,
    ) {
        for (name, vars) in &document.meta.hostvars {
            if !admitted.hosts.contains(name.as_str()) {
                continue;
            }
            graph.add_host(name);
            for (key, value) in vars {
                graph.set_host_var(name, key, value.clone());
            }
        }
    }

    /// Group-host and group-group edges, then group vars
    fn link(
        &self,
        document: &RawInventoryDocument,
        admitted: &Admitted<'_>,
        graph: &mut InventoryGraph,
    ) -> Result<()> {
        for (name, group) in &document.groups {
            if !admitted.groups.contains(name.as_str()) {
                continue;
            }

            if name != ROOT_GROUP {
                for host in &group.hosts {
                    if admitted.hosts.contains(host.as_str()) {
                        graph.add_member(name, host);
                    }
                }
                for child in &group.children {
                    if admitted.groups.contains(child.as_str()) {
                        graph.add_child(name, child)?;
                    } else {
                        trace!(group = %name, child = %child, "dropping link to filtered group");
                    }
                }
            }

            for (key, value) in &group.vars {
                graph.set_group_var(name, key, value.clone());
            }
        }
        Ok(())
    }
}
