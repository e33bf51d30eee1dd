//! Suggest Adjustment Handler

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
        models::{NoteRequest, ShortlistResponse},
    },
    state::State,
};

/// Suggest Adjustment Handler
///
/// Suggests the company relax or change its criteria. The status is left alone; the company is
/// notified.
#[endpoint(
    tags("fulfilment"),
    summary = "Suggest Criteria Adjustment",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<NoteRequest>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;

    let request = state
        .app
        .shortlists
        .suggest_adjustment(operator, shortlist.into_inner().into(), json.into_inner().note)
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
