//! Mark Paid Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::ShortlistResponse},
    state::State,
};

/// Mark Paid Handler
///
/// Records a payment taken outside the provider flow and moves the request to `authorized`.
#[endpoint(
    tags("fulfilment"),
    summary = "Confirm Payment Manually",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment recorded"),
        (status_code = StatusCode::CONFLICT, description = "Pricing not approved or a payment is already active"),
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
        .mark_paid(operator, shortlist.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
