//! ctlinv-core: Filtered inventory graphs from a controller
//!
//! Resolves options, fetches an inventory script through a
//! [`ControllerApi`](ctlinv_client::ControllerApi), filters hosts and groups
//! by regex and assembles an owned [`InventoryGraph`].

pub mod builder;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod graph;
pub mod metadata;
pub mod plugin;

pub use builder::GraphBuilder;
pub use config::{ConfigSource, FilterOptions, InventoryRef, Options, PluginConfig};
pub use error::{InventoryError, Result};
pub use filter::FilterSet;
pub use graph::{Group, Host, InventoryGraph};
pub use metadata::{METADATA_VAR, controller_metadata};
pub use plugin::InventoryPlugin;
