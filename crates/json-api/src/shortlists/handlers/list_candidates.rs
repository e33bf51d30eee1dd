//! List Candidates Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::CandidateResponse},
    state::State,
};

/// List Candidates Handler
///
/// Candidates of the latest matching pass, ordered by rank, then score.
#[endpoint(
    tags("candidates"),
    summary = "List Shortlist Candidates",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Vec<CandidateResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.operator_or_403()?;

    let candidates = state
        .app
        .shortlists
        .list_candidates(shortlist.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}
