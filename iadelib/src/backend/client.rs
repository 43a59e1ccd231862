//! HTTP access to the iA.Delib REST surface.

use async_trait::async_trait;
use reqwest::{Client, Response, header::ACCEPT};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::TransportError;
use crate::config::ConnectorConfig;

/// Backend endpoints, appended verbatim to a connector's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The base URL itself, used to check connectivity.
    Root,
    Item,
    Search,
    /// Annex upload onto the item with the given UID.
    Annex(String),
}

impl Endpoint {
    /// Builds the absolute URL for this endpoint.
    ///
    /// The base URL is expected to end with the site path separator (for example
    /// `https://delib.example.org/site/`), so the suffix is concatenated rather than
    /// joined.
    pub fn url(&self, base_url: &str) -> String {
        match self {
            Endpoint::Root => base_url.to_string(),
            Endpoint::Item => format!("{base_url}@item"),
            Endpoint::Search => format!("{base_url}@search"),
            Endpoint::Annex(uid) => format!("{base_url}@annex/{uid}"),
        }
    }
}

/// Authenticated JSON GET/POST against a remote endpoint.
///
/// Implemented over HTTP by [`ReqwestBackend`]; tests substitute their own
/// implementations to script responses and failures.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// GET `url` with the given query pairs appended, returning the parsed body.
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, TransportError>;

    /// POST `body` as JSON to `url`, returning the parsed body.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

/// The concrete implementation of `BackendClient`.
///
/// Every request carries Basic credentials from the connector and asks for JSON.
/// There is exactly one attempt per call; the client-wide timeout bounds it.
pub struct ReqwestBackend {
    client: Client,
    username: String,
    password: String,
}

impl ReqwestBackend {
    pub fn new(connector: &ConnectorConfig, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            username: connector.username.clone(),
            password: connector.password.clone(),
        })
    }
}

/// Reads the whole body and parses it as JSON, whatever the status code.
async fn decode(url: &Url, response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    if !status.is_success() {
        warn!(%url, %status, "Backend answered with a non-success status");
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        debug!(%url, "Response body was: {}", body);
        TransportError::from(e)
    })
}

#[async_trait]
impl BackendClient for ReqwestBackend {
    #[instrument(skip(self, params), err)]
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, TransportError> {
        let mut url = Url::parse(url)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        decode(&url, response).await
    }

    #[instrument(skip(self, body), err)]
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let url = Url::parse(url)?;

        let response = self
            .client
            .post(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        decode(&url, response).await
    }
}
