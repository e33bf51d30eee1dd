//! Confirm Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, models::ConfirmationResponse},
    state::State,
};

/// Confirm Payment Handler
///
/// Asks the provider whether the hold went through. Repeating the call after the payment has
/// settled returns it unchanged.
#[endpoint(
    tags("payments"),
    summary = "Confirm Payment",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Confirmation attempted"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Provider has not authorized the hold yet"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Provider unavailable"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ConfirmationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let company = depot.company_or_403()?;

    let confirmation = state
        .app
        .payments
        .confirm(company, payment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(confirmation.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use shortlist::payments::PaymentStatus;
    use testresult::TestResult;

    use shortlist_app::domain::{
        payments::{
            MockPaymentsService, PaymentsServiceError, data::Confirmation,
            records::{PaymentRecord, PaymentUuid},
        },
        shortlists::records::ShortlistRequestUuid,
    };

    use crate::test_helpers::{
        TEST_COMPANY, as_company, as_operator, make_payment, payments_service,
    };

    use super::*;

    fn make_service(payments: MockPaymentsService) -> Service {
        payments_service(
            payments,
            Router::with_path("payments/{payment}/confirm").post(handler),
        )
    }

    #[tokio::test]
    async fn test_confirm_returns_authorized_payment() -> TestResult {
        let uuid = PaymentUuid::new();
        let payment = PaymentRecord {
            status: PaymentStatus::Authorized,
            ..make_payment(uuid, ShortlistRequestUuid::new())
        };

        let mut payments = MockPaymentsService::new();

        payments
            .expect_confirm()
            .once()
            .withf(move |company, target| *company == TEST_COMPANY && *target == uuid)
            .return_once(move |_, _| {
                Ok(Confirmation {
                    payment,
                    changed: true,
                })
            });

        let mut res = as_company(TestClient::post(format!(
            "http://example.com/payments/{uuid}/confirm"
        )))
        .send(&make_service(payments))
        .await;

        let body: ConfirmationResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.changed, "first confirmation should change the payment");
        assert_eq!(body.payment.status, "authorized");

        Ok(())
    }

    #[tokio::test]
    async fn test_unconfirmed_hold_returns_409() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_confirm()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::NotYetAuthorized));

        let res = as_company(TestClient::post(format!(
            "http://example.com/payments/{}/confirm",
            PaymentUuid::new()
        )))
        .send(&make_service(payments))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_operators_cannot_confirm() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments.expect_confirm().never();

        let res = as_operator(TestClient::post(format!(
            "http://example.com/payments/{}/confirm",
            PaymentUuid::new()
        )))
        .send(&make_service(payments))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
