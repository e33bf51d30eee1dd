//! Archive Shortlist Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::ShortlistResponse},
    state::State,
};

/// Archive Shortlist Handler
///
/// Hides a closed request from the company's history. Nothing is deleted; archiving twice is a
/// no-op.
#[endpoint(
    tags("shortlists"),
    summary = "Archive Shortlist Request",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Request archived"),
        (status_code = StatusCode::CONFLICT, description = "Request is still open"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;

    let request = state
        .app
        .shortlists
        .archive(operator, shortlist.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
