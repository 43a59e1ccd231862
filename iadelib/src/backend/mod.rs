//! Outbound HTTP to iA.Delib and to the caller's demand records.
//!
//! - [`client`]: the [`BackendClient`] seam and its reqwest implementation
//! - [`error`]: the single [`TransportError`] every outbound call fails with

pub mod client;
pub mod error;

pub use client::{BackendClient, Endpoint, ReqwestBackend};
pub use error::TransportError;
