//! OpenAPI documentation for the connector API, served at `/docs`.

use utoipa::OpenApi;

use crate::api;
use crate::errors::ErrorBody;
use crate::submission::AnnexFailure;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "iA.Delib connector",
        description = "Create deliberation items and attach annexes on iA.Delib from submitted demands."
    ),
    paths(
        api::handlers::connectors::list_connectors,
        api::handlers::connectors::get_connector,
        api::handlers::connectors::test_connection,
        api::handlers::connectors::read_item,
        api::handlers::connectors::search_items,
        api::handlers::connectors::create_item,
        api::handlers::connectors::add_annexes,
    ),
    components(schemas(
        api::models::connectors::ConnectorSummary,
        api::models::connectors::AddAnnexesResponse,
        api::models::connectors::ReadItemQuery,
        AnnexFailure,
        ErrorBody,
    )),
    tags(
        (name = "connectors", description = "Hosted connector instances"),
        (name = "items", description = "Deliberation items and their annexes"),
    )
)]
pub struct ApiDoc;
