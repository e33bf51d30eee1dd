//! Get Shortlist Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::ShortlistResponse},
    state::State,
};

/// Get Shortlist Handler
///
/// Operators see every request; companies only their own.
#[endpoint(
    tags("shortlists"),
    summary = "Get Shortlist Request",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let request = state
        .app
        .shortlists
        .get_request(actor, shortlist.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
