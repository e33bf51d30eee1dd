//! Get Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use shortlist_app::domain::{payments::PaymentsServiceError, shortlists::data::Actor};

use crate::{
    extensions::*,
    payments::{errors::into_status_error, models::PaymentResponse},
    state::State,
};

/// Get Payment Handler
///
/// Companies only see their own payments.
#[endpoint(
    tags("payments"),
    summary = "Get Payment",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let payment = state
        .app
        .payments
        .get_payment(payment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    if let Actor::Company(company) = actor
        && payment.company != company
    {
        return Err(into_status_error(PaymentsServiceError::NotFound));
    }

    Ok(Json(payment.into()))
}
