//! Provider Notification Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::info;

use shortlist_app::domain::payments::data::ProviderNotification;

use crate::{
    extensions::*,
    payments::{
        errors::into_status_error,
        models::{ConfirmationResponse, NotificationRequest},
    },
    state::State,
};

/// Provider Notification Handler
///
/// Receives authorization results pushed by the payment provider. Replayed notifications for a
/// payment that has already settled are acknowledged without changes.
#[endpoint(
    tags("webhooks"),
    summary = "Provider Notification",
    security(("webhook_token" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Notification applied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown event"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid webhook token"),
        (status_code = StatusCode::NOT_FOUND, description = "No payment with that reference"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<NotificationRequest>,
    depot: &mut Depot,
) -> Result<Json<ConfirmationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let notification = ProviderNotification::try_from(json.into_inner())?;

    info!(
        provider = %notification.provider,
        provider_reference = %notification.provider_reference,
        "provider notification received"
    );

    let confirmation = state
        .app
        .payments
        .handle_notification(notification)
        .await
        .map_err(into_status_error)?;

    Ok(Json(confirmation.into()))
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use shortlist::payments::PaymentStatus;
    use testresult::TestResult;

    use shortlist_app::domain::{
        payments::{
            MockPaymentsService, PaymentsServiceError,
            data::{Confirmation, ProviderEvent},
            records::{PaymentRecord, PaymentUuid},
        },
        shortlists::{MockShortlistsService, records::ShortlistRequestUuid},
    };

    use crate::{
        payments::webhook::{self, WEBHOOK_TOKEN_HEADER},
        test_helpers::{TEST_WEBHOOK_TOKEN, make_payment, state},
    };

    use super::*;

    fn make_service(payments: MockPaymentsService) -> Service {
        Service::new(
            Router::with_path("webhooks/payments")
                .hoop(inject(state(MockShortlistsService::new(), payments)))
                .hoop(webhook::guard)
                .post(handler),
        )
    }

    #[tokio::test]
    async fn test_success_notification_authorizes_payment() -> TestResult {
        let uuid = PaymentUuid::new();
        let payment = PaymentRecord {
            status: PaymentStatus::Authorized,
            ..make_payment(uuid, ShortlistRequestUuid::new())
        };

        let mut payments = MockPaymentsService::new();

        payments
            .expect_handle_notification()
            .once()
            .withf(|notification| {
                notification.provider == "stripe"
                    && notification.provider_reference == "pi_123"
                    && notification.event == ProviderEvent::AuthorizationSucceeded
            })
            .return_once(move |_| {
                Ok(Confirmation {
                    payment,
                    changed: true,
                })
            });

        let mut res = TestClient::post("http://example.com/webhooks/payments")
            .add_header(WEBHOOK_TOKEN_HEADER, TEST_WEBHOOK_TOKEN, true)
            .json(&json!({
                "provider": "stripe",
                "provider_reference": "pi_123",
                "event": "authorization_succeeded",
            }))
            .send(&make_service(payments))
            .await;

        let body: ConfirmationResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.payment.status, "authorized");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_reference_returns_404() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_handle_notification()
            .once()
            .return_once(|_| Err(PaymentsServiceError::NotFound));

        let res = TestClient::post("http://example.com/webhooks/payments")
            .add_header(WEBHOOK_TOKEN_HEADER, TEST_WEBHOOK_TOKEN, true)
            .json(&json!({
                "provider": "stripe",
                "provider_reference": "pi_unknown",
                "event": "authorization_failed",
                "message": "card declined",
            }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_event_returns_400() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments.expect_handle_notification().never();

        let res = TestClient::post("http://example.com/webhooks/payments")
            .add_header(WEBHOOK_TOKEN_HEADER, TEST_WEBHOOK_TOKEN, true)
            .json(&json!({
                "provider": "stripe",
                "provider_reference": "pi_123",
                "event": "refunded",
            }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_token_never_reaches_the_service() -> TestResult {
        let mut payments = MockPaymentsService::new();

        payments.expect_handle_notification().never();

        let res = TestClient::post("http://example.com/webhooks/payments")
            .json(&json!({
                "provider": "stripe",
                "provider_reference": "pi_123",
                "event": "authorization_succeeded",
            }))
            .send(&make_service(payments))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
