//! Error types for the controller client

use thiserror::Error;

/// Errors that can occur when talking to the controller
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, DNS, TLS or protocol failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, if the server sent one
        message: String,
    },

    /// Response body is not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
