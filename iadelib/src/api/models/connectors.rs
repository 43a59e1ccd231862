//! API request and response models for connector endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::config::ConnectorConfig;
use crate::submission::{AddAnnexesOutcome, AnnexFailure};

/// Public metadata of a hosted connector. Credentials are never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectorSummary {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<&ConnectorConfig> for ConnectorSummary {
    fn from(config: &ConnectorConfig) -> Self {
        Self {
            title: config.title.clone(),
            slug: config.slug.clone(),
            description: config.description.clone(),
        }
    }
}

/// Query parameters for reading one item
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReadItemQuery {
    /// Item UID on the backend
    pub uid: String,
    /// Meeting configuration the item belongs to
    pub config_id: String,
}

/// Response of the add-annexes workflow.
///
/// `data` is null when nothing was requested or nothing was found.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddAnnexesResponse {
    /// Backend responses for the annexes that were accepted, in submission order
    #[schema(value_type = Option<Vec<Object>>)]
    pub data: Option<Vec<Value>>,
    /// Annexes the backend did not accept
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AnnexFailure>,
}

impl From<AddAnnexesOutcome> for AddAnnexesResponse {
    fn from(outcome: AddAnnexesOutcome) -> Self {
        match outcome {
            AddAnnexesOutcome::NoFilesRequested | AddAnnexesOutcome::NoAnnexesFound => Self {
                data: None,
                failures: vec![],
            },
            AddAnnexesOutcome::Sent(batch) => Self {
                data: Some(batch.data),
                failures: batch.failures,
            },
        }
    }
}
