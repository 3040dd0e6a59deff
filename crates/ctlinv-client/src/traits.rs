//! Controller API trait

use async_trait::async_trait;
use ctlinv_api::requests::{InventoryLookup, ScriptQuery};
use ctlinv_api::responses::{InventoryList, ServerConfig};
use ctlinv_api::script::RawInventoryDocument;

use crate::error::Result;

/// The three read-only endpoints an inventory run consumes
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// `GET /api/v2/inventories/?name=...`
    async fn lookup_inventory(&self, lookup: &InventoryLookup) -> Result<InventoryList>;

    /// `GET /api/v2/inventories/<id>/script/`
    async fn inventory_script(
        &self,
        inventory_id: &str,
        query: ScriptQuery,
    ) -> Result<RawInventoryDocument>;

    /// `GET /api/v2/config/`
    async fn server_config(&self) -> Result<ServerConfig>;
}
