//! Resolve Settlement Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use shortlist_app::domain::shortlists::data::SettlementResolution;

use crate::{
    extensions::*,
    shortlists::{
        errors::into_status_error,
        models::{SettlementResolutionRequest, ShortlistResponse},
    },
    state::State,
};

/// Resolve Settlement Handler
///
/// Closes a request whose outcome is decided but whose capture or release the provider
/// rejected. A failed payment stays failed and the note is kept in its audit trail.
#[endpoint(
    tags("fulfilment"),
    summary = "Resolve Settlement",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Settlement resolved and request closed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing note or no outcome decided"),
        (status_code = StatusCode::CONFLICT, description = "Request already closed"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider failure"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<SettlementResolutionRequest>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;
    let resolution = SettlementResolution::try_from(json.into_inner())?;

    let request = state
        .app
        .shortlists
        .resolve_settlement(operator, shortlist.into_inner().into(), resolution)
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}
