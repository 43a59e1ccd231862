//! Shared fixtures for unit and integration tests.

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Mutex, Once},
    time::Duration,
};

use crate::{
    backend::{BackendClient, TransportError},
    config::{Config, ConnectorConfig},
};

static CRYPTO_PROVIDER: Once = Once::new();

/// reqwest is built without a default rustls provider, so tests that open real
/// connections install one first.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

pub fn connector_config(slug: &str, url: &str) -> ConnectorConfig {
    ConnectorConfig {
        title: format!("iA.Delib {slug}"),
        slug: slug.to_string(),
        description: format!("Test connector {slug}"),
        url: url.to_string(),
        username: "delib-user".to_string(),
        password: "delib-password".to_string(),
    }
}

pub fn create_test_config(connectors: Vec<ConnectorConfig>) -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        connectors,
        ..Default::default()
    };
    config.backend.request_timeout = Duration::from_secs(2);
    config
}

/// Builds the full application around the given connectors.
pub fn create_test_app(connectors: Vec<ConnectorConfig>) -> TestServer {
    install_crypto_provider();
    let app = crate::Application::new(create_test_config(connectors)).expect("Failed to create application");
    app.into_test_server()
}

/// An uploaded file as the caller platform serialises it.
pub fn file_value(filename: &str, content: &str) -> Value {
    json!({"filename": filename, "content": content, "content_type": "application/pdf"})
}

/// A demand document with the given fields and, optionally, workflow fields.
pub fn demand_json(fields: Value, workflow_fields: Option<Value>) -> Value {
    match workflow_fields {
        Some(workflow_fields) => json!({"fields": fields, "workflow": {"fields": workflow_fields}}),
        None => json!({"fields": fields, "workflow": null}),
    }
}

/// In-memory backend answering every GET with one demand document.
///
/// POSTs answer `{"@id": <url>, "title": <body title>}` unless scripted to fail.
#[derive(Default)]
pub struct ScriptedBackend {
    demand: Value,
    demand_failure: Option<String>,
    item_failure: Option<String>,
    annex_failures: HashMap<String, String>,
    annex_delays: HashMap<String, u64>,
    gets: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, Value)>>,
}

impl ScriptedBackend {
    pub fn new(demand: Value) -> Self {
        Self {
            demand,
            ..Default::default()
        }
    }

    pub fn failing_demand(mut self, message: &str) -> Self {
        self.demand_failure = Some(message.to_string());
        self
    }

    /// Fails POSTs to the `@item` endpoint.
    pub fn failing_item(mut self, message: &str) -> Self {
        self.item_failure = Some(message.to_string());
        self
    }

    /// Fails POSTs whose body carries the given annex title.
    pub fn failing_annex(mut self, title: &str, message: &str) -> Self {
        self.annex_failures.insert(title.to_string(), message.to_string());
        self
    }

    pub fn with_annex_delay(mut self, title: &str, millis: u64) -> Self {
        self.annex_delays.insert(title.to_string(), millis);
        self
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    /// POSTs in the order they completed.
    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendClient for ScriptedBackend {
    async fn get_json(&self, url: &str, _params: &[(String, String)]) -> Result<Value, TransportError> {
        self.gets.lock().unwrap().push(url.to_string());
        match &self.demand_failure {
            Some(message) => Err(TransportError::new(message.clone())),
            None => Ok(self.demand.clone()),
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let title = body.get("title").and_then(Value::as_str).unwrap_or_default().to_string();
        if let Some(millis) = self.annex_delays.get(&title) {
            tokio::time::sleep(Duration::from_millis(*millis)).await;
        }
        self.posts.lock().unwrap().push((url.to_string(), body.clone()));

        if url.ends_with("@item") {
            if let Some(message) = &self.item_failure {
                return Err(TransportError::new(message.clone()));
            }
        }
        if let Some(message) = self.annex_failures.get(&title) {
            return Err(TransportError::new(message.clone()));
        }

        Ok(json!({"@id": url, "title": body.get("title").cloned().unwrap_or(Value::Null)}))
    }
}
