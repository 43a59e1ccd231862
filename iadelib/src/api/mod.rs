//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers, one set per connector instance
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! Every connector instance is served under `/ia-delib/{slug}`:
//!
//! - **Metadata** (`/ia-delib`, `/ia-delib/{slug}`): Hosted connectors, without credentials
//! - **Pass-through** (`test`, `read-item`, `search-items`): Backend JSON returned unmodified
//! - **Workflows** (`create-item`, `add-annexes`): Items and annexes built from a demand
//!
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
