//! ctlinv-client: HTTP client for the controller REST API
//!
//! Performs the authenticated GET requests an inventory run needs and
//! decodes their JSON bodies.
//!
//! # Example
//!
//! ```no_run
//! use ctlinv_api::requests::InventoryLookup;
//! use ctlinv_client::{ControllerApi, Credentials, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(
//!     "https://controller.example.com",
//!     Credentials::new("admin", "secret"),
//!     true,
//! )?;
//!
//! let found = client.lookup_inventory(&InventoryLookup::new("prod")).await?;
//! println!("{:?}", found.first_id());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod traits;

pub use error::{ClientError, Result};
pub use http::{Credentials, HttpClient};
pub use traits::ControllerApi;
