//! Item creation and annex submission.
//!
//! ```text
//! create_item(post_data)
//!   ├─ fetch_demand(api_url)
//!   ├─ extract + structure          // only if a selector key is present
//!   └─ POST {base}@item             // annexes embedded as __children__
//!
//! add_annexes(post_data)
//!   ├─ fetch_demand(api_url)
//!   ├─ extract + structure          // no selector / no file → no-op outcome
//!   └─ for each annex (bounded, ordered):
//!        POST {base}@annex/{UID}    // failures recorded, batch continues
//! ```

use anyhow::Context;
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::{
    annexes::{AnnexDocument, FileSelection, extract, structure},
    backend::{BackendClient, Endpoint, TransportError},
    demand::{Demand, fetch_demand},
    errors::{Error, Result},
};

/// Key under which a new item carries its embedded annexes.
pub const CHILDREN_KEY: &str = "__children__";

/// An annex the backend did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnnexFailure {
    pub title: String,
    pub reason: String,
}

/// Per-annex results of one add-annexes call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnexBatch {
    /// Backend responses for the annexes that were sent, in submission order
    pub data: Vec<Value>,
    pub failures: Vec<AnnexFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddAnnexesOutcome {
    /// The request carried no file selector key.
    NoFilesRequested,
    /// Selectors were given but matched no file in the demand.
    NoAnnexesFound,
    Sent(AnnexBatch),
}

fn required_str<'a>(post_data: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    match post_data.get(key) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value),
        Some(other) if !other.is_null() => Err(Error::BadRequest {
            message: format!("'{key}' must be a non-empty string"),
        }),
        _ => Err(Error::BadRequest {
            message: format!("missing '{key}' in request body"),
        }),
    }
}

fn annexes_for(demand: &Demand, selection: &FileSelection) -> Result<Vec<AnnexDocument>> {
    let entries = extract(demand.fields()?, demand.workflow_fields(), selection)?;
    Ok(structure(entries))
}

/// Creates an item on the backend, embedding the selected files as annexes.
///
/// `post_data` is forwarded as-is apart from the added `__children__` key, which
/// only appears when at least one annex was found.
#[instrument(skip_all, err)]
pub async fn create_item(backend: &dyn BackendClient, base_url: &str, mut post_data: Map<String, Value>) -> Result<Value> {
    let api_url = required_str(&post_data, "api_url")?.to_string();
    let selection = FileSelection::from_post_data(&post_data)?;

    let demand = fetch_demand(backend, &api_url).await?;

    if let Some(selection) = selection {
        let annexes = annexes_for(&demand, &selection)?;
        if !annexes.is_empty() {
            info!(count = annexes.len(), "Embedding annexes in new item");
            let children = serde_json::to_value(&annexes).context("serialize annexes")?;
            post_data.insert(CHILDREN_KEY.to_string(), children);
        }
    }

    backend
        .post_json(&Endpoint::Item.url(base_url), &Value::Object(post_data))
        .await
        .map_err(Error::upstream)
}

/// Adds the selected files as annexes of the existing item `post_data.UID`.
///
/// Each annex is posted on its own. A failed post is logged and recorded in the
/// batch failures; it never aborts the others. Only a missing field, a failed
/// demand fetch or inconsistent demand data fail the whole call.
#[instrument(skip_all, err)]
pub async fn add_annexes(
    backend: &dyn BackendClient,
    base_url: &str,
    post_data: &Map<String, Value>,
    max_concurrent_sends: usize,
) -> Result<AddAnnexesOutcome> {
    let uid = required_str(post_data, "UID")?;
    let api_url = required_str(post_data, "api_url")?;
    let selection = FileSelection::from_post_data(post_data)?;

    let demand = fetch_demand(backend, api_url).await?;

    let Some(selection) = selection else {
        info!(uid, "No file selector in request, nothing to send");
        return Ok(AddAnnexesOutcome::NoFilesRequested);
    };

    let annexes = annexes_for(&demand, &selection)?;
    if annexes.is_empty() {
        info!(uid, "No file found in demand, nothing to send");
        return Ok(AddAnnexesOutcome::NoAnnexesFound);
    }

    let target = Endpoint::Annex(uid.to_string()).url(base_url);
    let batch = send_annexes(backend, &target, annexes, max_concurrent_sends).await;
    Ok(AddAnnexesOutcome::Sent(batch))
}

async fn send_annex(backend: &dyn BackendClient, target: &str, annex: &AnnexDocument) -> std::result::Result<Value, TransportError> {
    info!("Send {}", annex.title);
    let body = serde_json::to_value(annex).map_err(|e| TransportError::new(format!("could not encode annex: {e}")))?;
    backend.post_json(target, &body).await
}

/// Posts every annex to `target`, at most `max_concurrent` at a time.
///
/// Results are collected in input order regardless of completion order.
pub async fn send_annexes(backend: &dyn BackendClient, target: &str, annexes: Vec<AnnexDocument>, max_concurrent: usize) -> AnnexBatch {
    let titles = annexes.iter().map(|a| a.title.as_str()).collect::<Vec<_>>().join(" ");
    info!("Starting to send documents {}", titles);

    let results: Vec<_> = stream::iter(annexes)
        .map(|annex| async move {
            let result = send_annex(backend, target, &annex).await;
            (annex.title, result)
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let mut batch = AnnexBatch::default();
    for (title, result) in results {
        match result {
            Ok(response) => batch.data.push(response),
            Err(e) => {
                error!("fail at {} : {}", title, e);
                batch.failures.push(AnnexFailure {
                    title,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(sent = batch.data.len(), failed = batch.failures.len(), "Finished sending documents");
    batch
}
