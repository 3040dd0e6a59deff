//! Error types for ctlinv-core

use ctlinv_client::ClientError;
use thiserror::Error;

/// Errors that abort an inventory run
///
/// None of these are retried; the first one ends the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Invalid or unconvertible option value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Connection, socket or protocol failure
    #[error("Connection to remote host failed: {0}")]
    Transport(String),

    /// Response body is not valid JSON, or describes an impossible group tree
    #[error("Failed to parse json from host: {0}")]
    Parse(String),

    /// Name lookup returned no inventory
    #[error("inventory not found: {0}")]
    Lookup(String),
}

impl InventoryError {
    /// Whether the error was raised before any request was sent
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, InventoryError::Config(_))
    }
}

impl From<ClientError> for InventoryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => InventoryError::Transport(e.to_string()),
            ClientError::Api { status, message } if message.is_empty() => {
                InventoryError::Transport(format!("HTTP Error {status}"))
            }
            ClientError::Api { status, message } => {
                InventoryError::Transport(format!("HTTP Error {status} with message: {message}"))
            }
            ClientError::Json(e) => InventoryError::Parse(e.to_string()),
            ClientError::Url(e) => InventoryError::Config(format!("invalid controller URL: {e}")),
        }
    }
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
