//! Uniform transport failure for every outbound call.

use thiserror::Error as ThisError;

/// Failure to reach a remote endpoint or to read a JSON document from it.
///
/// Connection errors, timeouts, malformed URLs and non-JSON bodies all collapse
/// into this one type: callers only ever need the message.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::new(format!("connection failed: {err}"))
        } else {
            Self::new(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("error decoding response body: {err}"))
    }
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        Self::new(format!("invalid URL: {err}"))
    }
}
