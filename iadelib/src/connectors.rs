//! Configured connector instances, addressed by slug.

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use tracing::info;

use crate::{
    backend::{BackendClient, ReqwestBackend},
    config::{Config, ConnectorConfig},
    errors::Error,
};

/// A connector instance together with the client bound to its credentials.
#[derive(Clone)]
pub struct Connector {
    pub config: ConnectorConfig,
    pub backend: Arc<dyn BackendClient>,
}

impl Connector {
    pub fn slug(&self) -> &str {
        &self.config.slug
    }

    pub fn base_url(&self) -> &str {
        &self.config.url
    }
}

/// Lookup table of connectors, iterated in configuration order.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: Vec<Connector>,
    by_slug: HashMap<String, usize>,
}

impl ConnectorRegistry {
    /// Builds one HTTP client per configured connector.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut registry = Self::default();
        for connector in &config.connectors {
            let backend = ReqwestBackend::new(connector, config.backend.request_timeout)
                .with_context(|| format!("build HTTP client for connector '{}'", connector.slug))?;
            registry.insert(connector.clone(), Arc::new(backend))?;
        }
        info!(count = registry.len(), "Loaded connectors");
        Ok(registry)
    }

    pub fn insert(&mut self, config: ConnectorConfig, backend: Arc<dyn BackendClient>) -> anyhow::Result<()> {
        if self.by_slug.contains_key(&config.slug) {
            anyhow::bail!("duplicate connector slug '{}'", config.slug);
        }
        self.by_slug.insert(config.slug.clone(), self.connectors.len());
        self.connectors.push(Connector { config, backend });
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Result<&Connector, Error> {
        self.by_slug
            .get(slug)
            .map(|&index| &self.connectors[index])
            .ok_or_else(|| Error::NotFound {
                resource: "connector".to_string(),
                id: slug.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.iter()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}
