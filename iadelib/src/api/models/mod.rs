//! API request and response models.
//!
//! - [`connectors`]: Connector metadata, query parameters and workflow responses

pub mod connectors;
