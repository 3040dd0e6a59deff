//! HTTP client for the controller REST API

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use ctlinv_api::requests::{InventoryLookup, ScriptQuery};
use ctlinv_api::responses::{InventoryList, ServerConfig};
use ctlinv_api::script::RawInventoryDocument;

use crate::error::{ClientError, Result};
use crate::traits::ControllerApi;

/// Basic-auth credentials
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP client for communicating with the controller
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl HttpClient {
    /// Create a new HTTP client
    ///
    /// Every request carries basic-auth credentials. With `validate_certs`
    /// off, invalid TLS certificates are accepted.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the TLS backend
    /// cannot be initialised.
    pub fn new(
        base_url: impl AsRef<str>,
        credentials: Credentials,
        validate_certs: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!validate_certs)
            .build()?;
        Self::with_client(base_url, credentials, client)
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(
        base_url: impl AsRef<str>,
        credentials: Credentials,
        client: Client,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Build a full URL from an absolute API path
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::Url)
    }

    fn lookup_url(&self, lookup: &InventoryLookup) -> Result<Url> {
        let mut url = self.url("/api/v2/inventories/")?;
        url.query_pairs_mut().extend_pairs(lookup.query_pairs());
        Ok(url)
    }

    fn script_url(&self, inventory_id: &str, query: ScriptQuery) -> Result<Url> {
        let mut url = self.url(&format!("/api/v2/inventories/{inventory_id}/script/"))?;
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        Ok(url)
    }

    fn config_url(&self) -> Result<Url> {
        self.url("/api/v2/config/")
    }

    /// Perform an authenticated GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ControllerApi for HttpClient {
    #[instrument(skip(self))]
    async fn lookup_inventory(&self, lookup: &InventoryLookup) -> Result<InventoryList> {
        self.get(self.lookup_url(lookup)?).await
    }

    #[instrument(skip(self))]
    async fn inventory_script(
        &self,
        inventory_id: &str,
        query: ScriptQuery,
    ) -> Result<RawInventoryDocument> {
        self.get(self.script_url(inventory_id, query)?).await
    }

    #[instrument(skip(self))]
    async fn server_config(&self) -> Result<ServerConfig> {
        self.get(self.config_url()?).await
    }
}
