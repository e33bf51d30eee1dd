//! Approve Pricing Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::ShortlistResponse},
    state::State,
};

/// Approve Pricing Handler
///
/// Accepts the proposed price. Follow-ups are discounted per the pricing rules; the approved
/// price is what gets authorized.
#[endpoint(
    tags("pricing"),
    summary = "Approve Pricing",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Pricing approved"),
        (status_code = StatusCode::CONFLICT, description = "No proposal awaiting approval"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let company = depot.company_or_403()?;

    let request = state
        .app
        .shortlists
        .approve_pricing(company, shortlist.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(request.into()))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use shortlist::{follow_up::PricingCategory, lifecycle::ShortlistStatus};
    use testresult::TestResult;

    use shortlist_app::domain::shortlists::{
        MockShortlistsService,
        records::{ShortlistRequestRecord, ShortlistRequestUuid},
    };

    use crate::test_helpers::{
        TEST_COMPANY, as_company, as_operator, make_request_in, shortlists_service,
    };

    use super::*;

    fn make_service(shortlists: MockShortlistsService) -> Service {
        shortlists_service(
            shortlists,
            Router::with_path("shortlists/{shortlist}/pricing/approve").post(handler),
        )
    }

    #[tokio::test]
    async fn test_approve_returns_discounted_price() -> TestResult {
        let uuid = ShortlistRequestUuid::new();
        let record = ShortlistRequestRecord {
            proposed_price: Some(10_000),
            approved_price: Some(7_000),
            pricing_category: PricingCategory::FollowUp,
            follow_up_discount_percent: Decimal::new(30, 0),
            ..make_request_in(uuid, ShortlistStatus::PricingApproved)
        };

        let mut shortlists = MockShortlistsService::new();

        shortlists
            .expect_approve_pricing()
            .once()
            .withf(move |company, request| *company == TEST_COMPANY && *request == uuid)
            .return_once(move |_, _| Ok(record));

        let mut res = as_company(TestClient::post(format!(
            "http://example.com/shortlists/{uuid}/pricing/approve"
        )))
        .send(&make_service(shortlists))
        .await;

        let body: ShortlistResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.approved_price, Some(7_000));
        assert_eq!(body.pricing_category, "follow_up");
        assert_eq!(body.follow_up_discount_percent, "30");

        Ok(())
    }

    #[tokio::test]
    async fn test_operators_cannot_approve() -> TestResult {
        let mut shortlists = MockShortlistsService::new();

        shortlists.expect_approve_pricing().never();

        let res = as_operator(TestClient::post(format!(
            "http://example.com/shortlists/{}/pricing/approve",
            ShortlistRequestUuid::new()
        )))
        .send(&make_service(shortlists))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
