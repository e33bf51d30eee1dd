//! Update Candidate Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{
        errors::into_status_error,
        models::{CandidateResponse, CandidateUpdateRequest},
    },
    state::State,
};

/// Update Candidate Handler
///
/// Approves, unapproves or re-ranks a candidate while the request is being curated.
#[endpoint(
    tags("candidates"),
    summary = "Update Shortlist Candidate",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Candidate updated"),
        (status_code = StatusCode::CONFLICT, description = "Request is no longer being curated"),
    ),
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    candidate: PathParam<Uuid>,
    json: JsonBody<CandidateUpdateRequest>,
    depot: &mut Depot,
) -> Result<Json<CandidateResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;

    let candidate = state
        .app
        .shortlists
        .update_candidate(
            operator,
            shortlist.into_inner().into(),
            candidate.into_inner().into(),
            json.into_inner().into(),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(candidate.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use shortlist::lifecycle::ShortlistStatus;
    use testresult::TestResult;

    use shortlist_app::domain::shortlists::{
        MockShortlistsService, ShortlistsServiceError,
        data::CandidateUpdate,
        records::{ShortlistCandidateRecord, ShortlistCandidateUuid, ShortlistRequestUuid},
    };

    use crate::test_helpers::{TEST_OPERATOR, as_operator, make_candidate, shortlists_service};

    use super::*;

    fn make_service(shortlists: MockShortlistsService) -> Service {
        shortlists_service(
            shortlists,
            Router::with_path("shortlists/{shortlist}/candidates/{candidate}").patch(handler),
        )
    }

    #[tokio::test]
    async fn test_update_candidate_approves_and_ranks() -> TestResult {
        let request = ShortlistRequestUuid::new();
        let uuid = ShortlistCandidateUuid::new();
        let approved = ShortlistCandidateRecord {
            approved: true,
            rank: Some(2),
            ..make_candidate(uuid, request)
        };

        let mut shortlists = MockShortlistsService::new();

        shortlists
            .expect_update_candidate()
            .once()
            .withf(move |operator, r, c, update| {
                *operator == TEST_OPERATOR
                    && *r == request
                    && *c == uuid
                    && *update
                        == CandidateUpdate {
                            approved: Some(true),
                            rank: Some(2),
                        }
            })
            .return_once(move |_, _, _, _| Ok(approved));

        let mut res = as_operator(TestClient::patch(format!(
            "http://example.com/shortlists/{request}/candidates/{uuid}"
        )))
        .json(&json!({ "approved": true, "rank": 2 }))
        .send(&make_service(shortlists))
        .await;

        let body: CandidateResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.approved, "candidate should be approved");
        assert_eq!(body.rank, Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_after_approval_returns_409() -> TestResult {
        let mut shortlists = MockShortlistsService::new();

        shortlists.expect_update_candidate().once().return_once(|_, _, _, _| {
            Err(ShortlistsServiceError::NotCurating(
                ShortlistStatus::PricingApproved,
            ))
        });

        let res = as_operator(TestClient::patch(format!(
            "http://example.com/shortlists/{}/candidates/{}",
            ShortlistRequestUuid::new(),
            ShortlistCandidateUuid::new()
        )))
        .json(&json!({ "approved": false }))
        .send(&make_service(shortlists))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
