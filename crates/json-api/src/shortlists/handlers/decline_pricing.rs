//! Decline Pricing Handler

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

/// Decline Pricing Handler
///
/// Rejects the proposal and hands the request back to the operator for re-curation.
#[endpoint(
    tags("pricing"),
    summary = "Decline Pricing",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<ReasonRequest>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let company = depot.company_or_403()?;

    let request = state
        .app
        .shortlists
        .decline_pricing(company, shortlist.into_inner().into(), json.into_inner().reason)
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
