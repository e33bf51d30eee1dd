//! Mark No Match Handler

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

/// Mark No Match Handler
///
/// Closes the request without a match and releases any held funds. The company may re-run the
/// same brief free of charge.
#[endpoint(
    tags("fulfilment"),
    summary = "Mark No Match",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<ReasonRequest>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;

    let request = state
        .app
        .shortlists
        .mark_no_match(operator, shortlist.into_inner().into(), json.into_inner().reason)
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
