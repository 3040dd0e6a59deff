//! One inventory run: resolve, fetch, filter, build

use std::sync::Arc;

use ctlinv_api::requests::ScriptQuery;
use ctlinv_client::{ControllerApi, Credentials, HttpClient};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::builder::GraphBuilder;
use crate::config::Options;
use crate::error::{InventoryError, Result};
use crate::filter::FilterSet;
use crate::graph::InventoryGraph;
use crate::metadata;

/// Inventory plugin
///
/// Holds validated options and compiled filters; each [`run`](Self::run)
/// is independent of the previous one.
pub struct InventoryPlugin {
    options: Options,
    filters: FilterSet,
    api: Arc<dyn ControllerApi>,
}

impl std::fmt::Debug for InventoryPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryPlugin")
            .field("options", &self.options)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl InventoryPlugin {
    /// Create a plugin talking to `api`
    ///
    /// # Errors
    /// Returns `InventoryError::Config` if a filter pattern is invalid.
    pub fn new(options: Options, api: Arc<dyn ControllerApi>) -> Result<Self> {
        let filters = FilterSet::from_options(&options.filters)?;
        Ok(Self {
            options,
            filters,
            api,
        })
    }

    /// Create a plugin with an HTTP client built from the options
    ///
    /// # Errors
    /// Returns `InventoryError::Config` if a filter pattern or the host URL
    /// is invalid.
    pub fn connect(options: Options) -> Result<Self> {
        let filters = FilterSet::from_options(&options.filters)?;
        let client = HttpClient::new(
            &options.host,
            Credentials::new(&options.username, &options.password),
            options.validate_certs,
        )?;
        Ok(Self {
            options,
            filters,
            api: Arc::new(client),
        })
    }

    /// Options this plugin was created with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Fetch the inventory and build the filtered graph
    ///
    /// # Errors
    /// Fails on the first transport, parse or lookup error; nothing is
    /// retried and no partial graph is returned.
    #[instrument(skip(self), fields(inventory = %self.options.inventory))]
    pub async fn run(&self) -> Result<InventoryGraph> {
        let inventory_id = self.resolve_inventory_id().await?;

        info!(%inventory_id, "fetching inventory script");
        let document = self
            .api
            .inventory_script(&inventory_id, ScriptQuery::default())
            .await?;
        debug!(
            groups = document.groups.len(),
            hosts = document.meta.hostvars.len(),
            "received inventory script"
        );

        if self.filters.is_empty() {
            debug!("no filters set, keeping every group and host");
        }
        let mut graph = GraphBuilder::new(&self.filters).build(&document)?;

        if self.options.include_metadata {
            info!("fetching controller metadata");
            let config = self.api.server_config().await?;
            metadata::augment(&mut graph, &config);
        }

        info!(
            groups = graph.groups().len(),
            hosts = graph.hosts().len(),
            "inventory built"
        );
        Ok(graph)
    }

    /// Turn the configured reference into the id used in the script URL
    async fn resolve_inventory_id(&self) -> Result<String> {
        let lookup = self.options.inventory.lookup();
        debug!(name = %lookup.name, organization = ?lookup.organization, "looking up inventory");
        let found = self.api.lookup_inventory(&lookup).await?;
        let id = found.first_id().ok_or_else(|| {
            InventoryError::Lookup(format!(
                "no inventory named {} on {}",
                self.options.inventory, self.options.host
            ))
        })?;

        Ok(id_segment(id))
    }
}

/// Render a looked-up id as a single path segment
fn id_segment(id: &Value) -> String {
    let raw = match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.replace('/', "")
}
