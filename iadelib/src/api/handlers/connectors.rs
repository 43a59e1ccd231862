//! HTTP handlers for connector endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::{
    AppState,
    api::models::connectors::{AddAnnexesResponse, ConnectorSummary, ReadItemQuery},
    backend::Endpoint,
    errors::{Error, ErrorBody, Result},
    submission,
};

fn json_object(body: &Bytes) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::BadRequest {
            message: "request body must be a JSON object".to_string(),
        }),
        Err(e) => Err(Error::BadRequest {
            message: format!("invalid JSON body: {e}"),
        }),
    }
}

#[utoipa::path(
    get,
    path = "/ia-delib",
    tag = "connectors",
    summary = "List connectors",
    description = "List the iA.Delib connector instances hosted by this service.",
    responses(
        (status = 200, description = "Hosted connectors", body = [ConnectorSummary]),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_connectors(State(state): State<AppState>) -> Json<Vec<ConnectorSummary>> {
    Json(state.connectors.iter().map(|c| ConnectorSummary::from(&c.config)).collect())
}

#[utoipa::path(
    get,
    path = "/ia-delib/{slug}",
    tag = "connectors",
    summary = "Get connector",
    params(("slug" = String, Path, description = "Connector slug")),
    responses(
        (status = 200, description = "Connector metadata", body = ConnectorSummary),
        (status = 404, description = "Unknown connector", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn get_connector(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<ConnectorSummary>> {
    let connector = state.connectors.get(&slug)?;
    Ok(Json(ConnectorSummary::from(&connector.config)))
}

#[utoipa::path(
    get,
    path = "/ia-delib/{slug}/test",
    tag = "connectors",
    summary = "Test connection",
    description = "Fetch the backend site root with the connector credentials and return its JSON.",
    params(("slug" = String, Path, description = "Connector slug")),
    responses(
        (status = 200, description = "Backend site document"),
        (status = 404, description = "Unknown connector", body = ErrorBody),
        (status = 502, description = "Backend unreachable or did not answer with JSON", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn test_connection(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Value>> {
    let connector = state.connectors.get(&slug)?;
    let document = connector.backend.get_json(&Endpoint::Root.url(connector.base_url()), &[]).await?;
    Ok(Json(document))
}

#[utoipa::path(
    get,
    path = "/ia-delib/{slug}/read-item",
    tag = "items",
    summary = "Read item",
    description = "Fetch one item from the backend by UID within a meeting configuration.",
    params(("slug" = String, Path, description = "Connector slug"), ReadItemQuery),
    responses(
        (status = 200, description = "Backend item document"),
        (status = 400, description = "Missing query parameter", body = ErrorBody),
        (status = 404, description = "Unknown connector", body = ErrorBody),
        (status = 405, description = "Backend call failed", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn read_item(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: std::result::Result<Query<ReadItemQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let connector = state.connectors.get(&slug)?;
    let Query(query) = query.map_err(|e| Error::BadRequest { message: e.body_text() })?;

    let params = vec![("UID".to_string(), query.uid), ("config_id".to_string(), query.config_id)];
    let document = connector
        .backend
        .get_json(&Endpoint::Item.url(connector.base_url()), &params)
        .await
        .map_err(Error::upstream)?;
    Ok(Json(document))
}

#[utoipa::path(
    get,
    path = "/ia-delib/{slug}/search-items",
    tag = "items",
    summary = "Search items",
    description = "Run a backend search. Every query parameter is forwarded unchanged, repeated keys included.",
    params(("slug" = String, Path, description = "Connector slug")),
    responses(
        (status = 200, description = "Backend search results"),
        (status = 404, description = "Unknown connector", body = ErrorBody),
        (status = 405, description = "Backend call failed", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn search_items(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>> {
    let connector = state.connectors.get(&slug)?;
    let document = connector
        .backend
        .get_json(&Endpoint::Search.url(connector.base_url()), &params)
        .await
        .map_err(Error::upstream)?;
    Ok(Json(document))
}

#[utoipa::path(
    post,
    path = "/ia-delib/{slug}/create-item",
    tag = "items",
    summary = "Create item",
    description = "Create a backend item from the request body. When file selectors are given, the matching \
        files of the demand at `api_url` are embedded as annexes under `__children__`.",
    params(("slug" = String, Path, description = "Connector slug")),
    request_body(content = Object, description = "Item fields plus `api_url` and optional `simple_files`, `workflow_files`, `blocs_of_files`"),
    responses(
        (status = 200, description = "Backend response to the item creation"),
        (status = 400, description = "Malformed request body", body = ErrorBody),
        (status = 404, description = "Unknown connector", body = ErrorBody),
        (status = 405, description = "Item creation failed on the backend", body = ErrorBody),
        (status = 422, description = "Demand data inconsistent with the file selectors", body = ErrorBody),
        (status = 502, description = "Demand could not be fetched", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn create_item(State(state): State<AppState>, Path(slug): Path<String>, body: Bytes) -> Result<Json<Value>> {
    let connector = state.connectors.get(&slug)?;
    let post_data = json_object(&body)?;
    let response = submission::create_item(connector.backend.as_ref(), connector.base_url(), post_data).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/ia-delib/{slug}/add-annexes",
    tag = "items",
    summary = "Add annexes",
    description = "Attach the selected files of the demand at `api_url` to the existing item `UID`, one request \
        per file. A file the backend rejects is reported under `failures` without aborting the others.",
    params(("slug" = String, Path, description = "Connector slug")),
    request_body(content = Object, description = "`UID`, `api_url` and optional `simple_files`, `workflow_files`, `blocs_of_files`"),
    responses(
        (status = 200, description = "Per-annex results", body = AddAnnexesResponse),
        (status = 400, description = "Malformed request body", body = ErrorBody),
        (status = 404, description = "Unknown connector", body = ErrorBody),
        (status = 422, description = "Demand data inconsistent with the file selectors", body = ErrorBody),
        (status = 502, description = "Demand could not be fetched", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn add_annexes(State(state): State<AppState>, Path(slug): Path<String>, body: Bytes) -> Result<Json<AddAnnexesResponse>> {
    let connector = state.connectors.get(&slug)?;
    let post_data = json_object(&body)?;
    let outcome = submission::add_annexes(
        connector.backend.as_ref(),
        connector.base_url(),
        &post_data,
        state.config.backend.max_concurrent_annex_sends,
    )
    .await?;
    Ok(Json(outcome.into()))
}
