use crate::annexes::ExtractionError;
use crate::backend::TransportError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// A remote endpoint could not be reached or did not answer with JSON.
    /// A failed demand fetch stays here (502) for create-item too, unlike its final POST.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Backend call failed on an endpoint that reports failures with the legacy 405 status
    #[error("{message}")]
    Upstream { message: String },

    /// The submitted record is inconsistent with the requested file selection
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Error envelope returned to the caller platform.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Always 1 for errors
    pub err: u8,
    pub err_desc: String,
}

impl Error {
    /// Wraps a backend transport failure as the caller-facing API error.
    ///
    /// The 405 status has no HTTP meaning here; it is what existing callers of
    /// `read-item`, `search-items` and `create-item` expect.
    pub fn upstream(err: TransportError) -> Self {
        Error::Upstream {
            message: err.message().to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Transport(_) => StatusCode::BAD_GATEWAY,
            Error::Upstream { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Transport(_) | Error::Upstream { .. } => {
                tracing::warn!("Upstream error: {}", self);
            }
            Error::Extraction(_) => {
                tracing::warn!("Inconsistent submission data: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ErrorBody {
            err: 1,
            err_desc: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
