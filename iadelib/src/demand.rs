//! Fetching the caller's submission record ("demand").

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::annexes::ExtractionError;
use crate::backend::{BackendClient, TransportError};

/// A demand document as fetched. Its shape is only checked once files are
/// actually read out of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Demand {
    document: Value,
}

impl Demand {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The demand's `fields` mapping.
    pub fn fields(&self) -> Result<&Map<String, Value>, ExtractionError> {
        self.document
            .get("fields")
            .and_then(Value::as_object)
            .ok_or(ExtractionError::MissingDemandFields)
    }

    /// `workflow.fields`, if the demand has a workflow carrying fields.
    pub fn workflow_fields(&self) -> Option<&Map<String, Value>> {
        self.document.get("workflow")?.get("fields")?.as_object()
    }
}

/// Retrieves the demand at `api_url` with the connector's credentials.
///
/// Any JSON document is accepted.
#[instrument(skip(backend), err)]
pub async fn fetch_demand(backend: &dyn BackendClient, api_url: &str) -> Result<Demand, TransportError> {
    let document = backend.get_json(api_url, &[]).await?;
    let demand = Demand::new(document);
    debug!(
        fields = demand.fields().map(Map::len).ok(),
        workflow_fields = demand.workflow_fields().map(Map::len),
        "Fetched demand"
    );
    Ok(demand)
}
