//! Expire Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, models::PaymentResponse},
    state::State,
};

/// Expire Payment Handler
///
/// Voids a pending hold and hands the request back to the company for a new authorization.
#[endpoint(
    tags("payments"),
    summary = "Expire Payment",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Hold expired"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment is no longer pending"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.operator_or_403()?;

    let payment = state
        .app
        .payments
        .expire(payment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(payment.into()))
}
