//! Cancel Shortlist Handler

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
        models::{ReasonRequest, ShortlistResponse},
    },
    state::State,
};

/// Cancel Shortlist Handler
///
/// Either party can cancel before delivery. Held funds are released.
#[endpoint(
    tags("shortlists"),
    summary = "Cancel Shortlist Request",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Request cancelled"),
        (status_code = StatusCode::CONFLICT, description = "Request already delivered or closed"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider failure"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<ReasonRequest>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let request = state
        .app
        .shortlists
        .cancel(actor, shortlist.into_inner().into(), json.into_inner().reason)
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
