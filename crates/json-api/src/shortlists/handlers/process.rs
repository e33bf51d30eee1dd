//! Process Shortlist Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::ProcessedResponse},
    state::State,
};

/// Process Shortlist Handler
///
/// Runs a matching pass. Follow-ups skip candidates recommended earlier in the chain; every
/// pass is stored under a new pass number.
#[endpoint(
    tags("candidates"),
    summary = "Run Matching Pass",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Ranked candidates of the new pass"),
        (status_code = StatusCode::CONFLICT, description = "Request cannot be processed in its status"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProcessedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;

    let processed = state
        .app
        .shortlists
        .process(operator, shortlist.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(processed.into()))
}
