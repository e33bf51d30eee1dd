//! Propose Scope Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{
        errors::into_status_error,
        models::{ProposeScopeRequest, ShortlistResponse},
    },
    state::State,
};

/// Propose Scope Handler
///
/// Sends a price and candidate count to the company for approval.
#[endpoint(
    tags("pricing"),
    summary = "Propose Scope",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Scope proposed, awaiting the company"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid price or count"),
        (status_code = StatusCode::CONFLICT, description = "Request cannot be priced in its status"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<ProposeScopeRequest>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;

    let request = state
        .app
        .shortlists
        .propose_scope(operator, shortlist.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
