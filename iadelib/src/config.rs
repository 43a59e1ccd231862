//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `IADELIB_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `IADELIB_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `IADELIB_BACKEND__REQUEST_TIMEOUT=5s` sets the `backend.request_timeout` field.
//!
//! ## Example
//!
//! ```yaml
//! port: 3001
//! backend:
//!   request_timeout: 8s
//!   max_concurrent_annex_sends: 4
//! connectors:
//!   - title: iA.Delib Commune
//!     slug: delib-commune
//!     description: Points du collège communal
//!     url: https://delib.commune.be/site/
//!     username: publik
//!     password: secret
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, time::Duration};
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "IADELIB_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Export traces over OTLP (configured through the standard `OTEL_*` variables)
    pub enable_otel_export: bool,
    /// Settings shared by every outbound call
    pub backend: BackendConfig,
    /// Connector instances served by this process, addressed by slug
    pub connectors: Vec<ConnectorConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Upper bound for a single outbound request, connection included
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// How many annexes of one add-annexes call may be in flight at once
    pub max_concurrent_annex_sends: usize,
}

/// One iA.Delib connector instance.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorConfig {
    pub title: String,
    /// Unique identifier, used in the route path
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Base URL of the iA.Delib site; endpoint suffixes such as `@item` are appended to it
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("title", &self.title)
            .field("slug", &self.slug)
            .field("description", &self.description)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            enable_otel_export: false,
            backend: BackendConfig::default(),
            connectors: vec![],
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(8),
            max_concurrent_annex_sends: 4,
        }
    }
}

impl ConnectorConfig {
    fn validate(&self) -> Result<(), Error> {
        let valid_slug = !self.slug.is_empty()
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_slug {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: connector slug '{}' must be non-empty and contain only letters, digits, '-' or '_'",
                    self.slug
                ),
            });
        }

        if !self.url.is_empty() {
            let parsed = Url::parse(&self.url).map_err(|e| Error::Internal {
                operation: format!("Config validation: connector '{}' has an invalid url '{}': {e}", self.slug, self.url),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Internal {
                    operation: format!(
                        "Config validation: connector '{}' url must use http or https, got '{}'",
                        self.slug,
                        parsed.scheme()
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.backend.request_timeout.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: backend.request_timeout must be greater than zero".to_string(),
            });
        }

        if self.backend.max_concurrent_annex_sends == 0 {
            return Err(Error::Internal {
                operation: "Config validation: backend.max_concurrent_annex_sends must be at least 1".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for connector in &self.connectors {
            connector.validate()?;
            if !seen.insert(connector.slug.as_str()) {
                return Err(Error::Internal {
                    operation: format!("Config validation: duplicate connector slug '{}'", connector.slug),
                });
            }
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // IADELIB_CONFIG names the file itself, not a field
            .merge(Env::prefixed("IADELIB_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
