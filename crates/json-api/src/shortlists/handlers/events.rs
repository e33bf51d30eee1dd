//! Shortlist Events Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::EventResponse},
    state::State,
};

/// Shortlist Events Handler
///
/// The request's audit trail, oldest first.
#[endpoint(
    tags("audit"),
    summary = "List Shortlist Events",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Vec<EventResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let events = state
        .app
        .shortlists
        .events(actor, shortlist.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(events.into_iter().map(Into::into).collect()))
}
