//! List Shortlists Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::ShortlistResponse},
    state::State,
};

/// List Shortlists Handler
///
/// Returns the company's shortlist requests, newest first. Archived requests are left out.
#[endpoint(
    tags("shortlists"),
    summary = "List Shortlist Requests",
    security(("actor" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<ShortlistResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let company = depot.company_or_403()?;

    let requests = state
        .app
        .shortlists
        .list_requests(company)
        .await
        .map_err(into_status_error)?;

    Ok(Json(requests.into_iter().map(Into::into).collect()))
}
