//! Payment Audit Trail Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, models::AuditEntryResponse},
    state::State,
};

/// Payment Audit Trail Handler
///
/// Every status change recorded for the payment, oldest first.
#[endpoint(
    tags("payments", "audit"),
    summary = "Payment Audit Trail",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Vec<AuditEntryResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.operator_or_403()?;

    let entries = state
        .app
        .payments
        .audit_trail(payment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
