//! HTTP request handlers.
//!
//! - [`connectors`]: Connector metadata, backend pass-through endpoints and the
//!   item/annex workflows

pub mod connectors;
