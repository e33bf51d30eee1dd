//! Deliver Shortlist Handler

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
        models::{DeliveryRequest, ShortlistResponse},
    },
    state::State,
};

/// Deliver Shortlist Handler
///
/// Hands the shortlist over, counting the approved candidates against the proposal. The outcome is decided separately and settles the payment.
#[endpoint(
    tags("fulfilment"),
    summary = "Deliver Shortlist",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Shortlist delivered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Price override out of range"),
        (status_code = StatusCode::CONFLICT, description = "Request is not authorized"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<DeliveryRequest>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;

    let request = state
        .app
        .shortlists
        .deliver(operator, shortlist.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
