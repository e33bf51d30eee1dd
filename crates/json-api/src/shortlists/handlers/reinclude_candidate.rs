//! Reinclude Candidate Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{
        errors::into_status_error,
        models::{CandidateResponse, ReinclusionRequest},
    },
    state::State,
};

/// Reinclude Candidate Handler
///
/// Brings back a candidate recommended on an earlier request of the follow-up chain. A reason is
/// required.
#[endpoint(
    tags("candidates"),
    summary = "Reinclude Candidate",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Candidate added to the current pass"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing reason or candidate not previously recommended"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown candidate"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<ReinclusionRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CandidateResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;
    let shortlist = shortlist.into_inner();

    let candidate = state
        .app
        .shortlists
        .reinclude_candidate(operator, shortlist.into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(
        LOCATION,
        format!("/shortlists/{shortlist}/candidates/{}", candidate.uuid),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    Ok(Json(candidate.into()))
}
