//! Decide Outcome Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use shortlist_app::domain::shortlists::data::OutcomeInput;

use crate::{
    extensions::*,
    shortlists::{
        errors::into_status_error,
        models::{OutcomeRequest, ShortlistResponse},
    },
    state::State,
};

/// Decide Outcome Handler
///
/// Decides the outcome once and settles the held funds: `delivered` captures in full, `partial`
/// captures the discounted or overridden amount, `no_match` and `cancelled` release the hold.
#[endpoint(
    tags("fulfilment"),
    summary = "Decide Outcome",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Outcome decided and payment settled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown outcome, missing reason or invalid partial terms"),
        (status_code = StatusCode::CONFLICT, description = "Outcome already decided"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment provider failure; outcome kept, settlement pending"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    json: JsonBody<OutcomeRequest>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;
    let input = OutcomeInput::try_from(json.into_inner())?;

    let request = state
        .app
        .shortlists
        .decide_outcome(operator, shortlist.into_inner().into(), input)
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use shortlist::{
        lifecycle::{OutcomeError, ShortlistOutcome, ShortlistStatus},
        payments::PartialTerms,
    };
    use testresult::TestResult;

    use shortlist_app::domain::{
        payments::{PaymentsServiceError, ProviderError},
        shortlists::{
            MockShortlistsService, ShortlistsServiceError,
            records::{ShortlistRequestRecord, ShortlistRequestUuid},
        },
    };

    use crate::test_helpers::{as_operator, make_request_in, shortlists_service};

    use super::*;

    fn make_service(shortlists: MockShortlistsService) -> Service {
        shortlists_service(
            shortlists,
            Router::with_path("shortlists/{shortlist}/outcome").post(handler),
        )
    }

    fn url(uuid: ShortlistRequestUuid) -> String {
        format!("http://example.com/shortlists/{uuid}/outcome")
    }

    #[tokio::test]
    async fn test_partial_outcome_forwards_terms() -> TestResult {
        let uuid = ShortlistRequestUuid::new();
        let record = ShortlistRequestRecord {
            outcome: ShortlistOutcome::Partial,
            outcome_reason: Some("three of five delivered".to_string()),
            ..make_request_in(uuid, ShortlistStatus::Completed)
        };

        let mut shortlists = MockShortlistsService::new();

        shortlists
            .expect_decide_outcome()
            .once()
            .withf(move |_, request, input| {
                *request == uuid
                    && input.outcome == ShortlistOutcome::Partial
                    && input.partial
                        == Some(PartialTerms {
                            discount_percent: Some(Decimal::new(40, 0)),
                            override_amount: None,
                        })
            })
            .return_once(move |_, _, _| Ok(record));

        let mut res = as_operator(TestClient::post(url(uuid)))
            .json(&json!({
                "outcome": "partial",
                "reason": "three of five delivered",
                "partial_discount_percent": "40",
            }))
            .send(&make_service(shortlists))
            .await;

        let body: ShortlistResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "completed");
        assert_eq!(body.outcome, "partial");

        Ok(())
    }

    #[tokio::test]
    async fn test_second_decision_returns_409() -> TestResult {
        let mut shortlists = MockShortlistsService::new();

        shortlists.expect_decide_outcome().once().return_once(|_, _, _| {
            Err(ShortlistsServiceError::Outcome(OutcomeError::AlreadyDecided {
                current: ShortlistOutcome::Delivered,
            }))
        });

        let res = as_operator(TestClient::post(url(ShortlistRequestUuid::new())))
            .json(&json!({ "outcome": "no_match", "reason": "changed our mind" }))
            .send(&make_service(shortlists))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_provider_failure_returns_502() -> TestResult {
        let mut shortlists = MockShortlistsService::new();

        shortlists.expect_decide_outcome().once().return_once(|_, _, _| {
            Err(ShortlistsServiceError::Payment(PaymentsServiceError::Provider(
                ProviderError::UnexpectedResponse("503".to_string()),
            )))
        });

        let res = as_operator(TestClient::post(url(ShortlistRequestUuid::new())))
            .json(&json!({ "outcome": "delivered", "reason": "all five hired" }))
            .send(&make_service(shortlists))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_outcome_never_reaches_the_service() -> TestResult {
        let mut shortlists = MockShortlistsService::new();

        shortlists.expect_decide_outcome().never();

        let res = as_operator(TestClient::post(url(ShortlistRequestUuid::new())))
            .json(&json!({ "outcome": "refunded", "reason": "n/a" }))
            .send(&make_service(shortlists))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
