//! Authorize Payment Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use crate::{
    extensions::*,
    payments::{
        errors::into_status_error,
        models::{AuthorizeRequest, PaymentResponse},
    },
    state::State,
};

/// Authorize Payment Handler
///
/// Places a hold for the approved price. The payment stays `pending_approval` until the company
/// confirms it with the provider using the returned client handle.
#[endpoint(
    tags("payments"),
    summary = "Authorize Payment",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Hold placed, awaiting confirmation"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown provider"),
        (status_code = StatusCode::NOT_FOUND, description = "Shortlist request not found"),
        (status_code = StatusCode::CONFLICT, description = "Pricing not approved or a payment is already active"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Provider declined or failed"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AuthorizeRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let company = depot.company_or_403()?;

    let payment = state
        .app
        .payments
        .authorize(company, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/payments/{}", payment.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(payment.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use shortlist_app::domain::{
        payments::{
            MockPaymentsService, PaymentsServiceError, ProviderError, data::NewAuthorization,
            records::PaymentUuid,
        },
        shortlists::records::ShortlistRequestUuid,
    };

    use crate::test_helpers::{TEST_COMPANY, as_company, make_payment, payments_service};

    use super::*;

    fn make_service(payments: MockPaymentsService) -> Service {
        payments_service(payments, Router::with_path("payments").post(handler))
    }

    #[tokio::test]
    async fn test_authorize_returns_201_with_client_handle() -> TestResult {
        let request = ShortlistRequestUuid::new();
        let uuid = PaymentUuid::new();
        let payment = make_payment(uuid, request);

        let mut payments = MockPaymentsService::new();

        payments
            .expect_authorize()
            .once()
            .withf(move |company, authorization| {
                *company == TEST_COMPANY
                    && *authorization
                        == NewAuthorization {
                            request,
                            provider: None,
                        }
            })
            .return_once(move |_, _| Ok(payment));

        let mut res = as_company(TestClient::post("http://example.com/payments"))
            .json(&json!({ "request": request.into_uuid() }))
            .send(&make_service(payments))
            .await;

        let body: PaymentResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/payments/{uuid}").as_str()));
        assert_eq!(body.status, "pending_approval");
        assert_eq!(body.client_handle, Some(format!("secret_{uuid}")));

        Ok(())
    }

    #[tokio::test]
    async fn test_declined_authorization_returns_502() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments.expect_authorize().once().return_once(|_, _| {
            Err(PaymentsServiceError::Provider(ProviderError::Declined(
                "card declined".to_string(),
            )))
        });

        let res = as_company(TestClient::post("http://example.com/payments"))
            .json(&json!({ "request": ShortlistRequestUuid::new().into_uuid() }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }

    #[tokio::test]
    async fn test_second_hold_returns_409() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_authorize()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::PaymentAlreadyActive));

        let res = as_company(TestClient::post("http://example.com/payments"))
            .json(&json!({ "request": ShortlistRequestUuid::new().into_uuid() }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
