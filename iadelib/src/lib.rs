//! # iadelib: iA.Delib connector service
//!
//! `iadelib` lets a citizen-request platform hand submitted demands over to iA.Delib, the
//! deliberation-management backend used by municipalities. It creates deliberation items from a
//! demand and attaches the files uploaded with it as annexes, and exposes a few read-only
//! pass-through endpoints on the backend.
//!
//! ## Request Flow
//!
//! Every inbound call names a connector instance by slug (`/ia-delib/{slug}/...`). The instance
//! carries the backend base URL and the Basic credentials used for every outbound call, including
//! the fetch of the caller's demand at `api_url`.
//!
//! - **Pass-through** (`test`, `read-item`, `search-items`): one GET on the backend, JSON returned
//!   unmodified.
//! - **create-item**: fetch the demand, gather the files named by the request's selectors
//!   ([`annexes`]), and POST the item with the files embedded under `__children__`.
//! - **add-annexes**: same gathering, then one POST per file onto the existing item. Each file
//!   succeeds or fails on its own; failures are reported without aborting the rest
//!   ([`submission`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use iadelib::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = iadelib::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     iadelib::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config)?
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod annexes;
pub mod api;
pub mod backend;
pub mod config;
pub mod connectors;
pub mod demand;
pub mod errors;
mod openapi;
pub mod submission;
pub mod telemetry;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use connectors::ConnectorRegistry;
use openapi::ApiDoc;

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .connectors(Arc::new(registry))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub connectors: Arc<ConnectorRegistry>,
}

/// Builds the HTTP router: health check, connector API and documentation.
pub fn build_router(state: AppState) -> Router {
    use api::handlers::connectors as handlers;

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/ia-delib", get(handlers::list_connectors))
        .route("/ia-delib/{slug}", get(handlers::get_connector))
        .route("/ia-delib/{slug}/test", get(handlers::test_connection))
        .route("/ia-delib/{slug}/read-item", get(handlers::read_item))
        .route("/ia-delib/{slug}/search-items", get(handlers::search_items))
        .route("/ia-delib/{slug}/create-item", post(handlers::create_item))
        .route("/ia-delib/{slug}/add-annexes", post(handlers::add_annexes))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The configured service, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Builds the connector registry and router. No network access happens here.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let registry = ConnectorRegistry::from_config(&config)?;
        let state = AppState::builder()
            .config(config.clone())
            .connectors(Arc::new(registry))
            .build();

        Ok(Self {
            router: build_router(state),
            config,
        })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            connectors = self.config.connectors.len(),
            "iA.Delib connector listening on http://{}", bind_addr
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
