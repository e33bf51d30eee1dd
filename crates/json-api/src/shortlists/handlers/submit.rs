//! Submit Shortlist Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use shortlist_app::domain::shortlists::data::NewShortlistRequest;

use crate::{
    extensions::*,
    shortlists::{
        errors::into_status_error,
        models::{ShortlistResponse, SubmitShortlistRequest},
    },
    state::State,
};

/// Submit Shortlist Handler
///
/// Creates a request for a curated shortlist. Requests similar to a recently completed one are
/// priced as follow-ups; a re-run of a request that found no match is free.
#[endpoint(
    tags("shortlists"),
    summary = "Submit Shortlist Request",
    security(("actor" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Shortlist request created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Companies only"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<SubmitShortlistRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ShortlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let company = depot.company_or_403()?;
    let new_request = NewShortlistRequest::try_from(json.into_inner())?;

    let request = state
        .app
        .shortlists
        .submit(company, new_request)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/shortlists/{}", request.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(request.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use shortlist::seniority::Seniority;
    use testresult::TestResult;

    use shortlist_app::domain::shortlists::{
        MockShortlistsService, ShortlistsServiceError, records::ShortlistRequestUuid,
    };

    use crate::test_helpers::{
        TEST_COMPANY, as_company, as_operator, make_request, shortlists_service,
    };

    use super::*;

    fn make_service(shortlists: MockShortlistsService) -> Service {
        shortlists_service(shortlists, Router::with_path("shortlists").post(handler))
    }

    fn body() -> serde_json::Value {
        json!({
            "criteria": {
                "role_title": "Backend Engineer",
                "tech_stack": ["Rust", "Postgres"],
                "seniority": "senior",
            },
        })
    }

    #[tokio::test]
    async fn test_submit_returns_201_with_location() -> TestResult {
        let uuid = ShortlistRequestUuid::new();
        let record = make_request(uuid);

        let mut shortlists = MockShortlistsService::new();

        shortlists
            .expect_submit()
            .once()
            .withf(|company, new| {
                *company == TEST_COMPANY
                    && new.criteria.seniority == Some(Seniority::Senior)
                    && new.criteria.tech_stack == ["Rust", "Postgres"]
                    && new.currency.is_none()
            })
            .return_once(move |_, _| Ok(record));

        let mut res = as_company(TestClient::post("http://example.com/shortlists"))
            .json(&body())
            .send(&make_service(shortlists))
            .await;

        let response: ShortlistResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/shortlists/{uuid}").as_str()));
        assert_eq!(response.uuid, uuid.into_uuid());
        assert_eq!(response.status, "submitted");

        Ok(())
    }

    #[tokio::test]
    async fn test_operators_cannot_submit() -> TestResult {
        let mut shortlists = MockShortlistsService::new();

        shortlists.expect_submit().never();

        let res = as_operator(TestClient::post("http://example.com/shortlists"))
            .json(&body())
            .send(&make_service(shortlists))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_seniority_returns_400() -> TestResult {
        let mut shortlists = MockShortlistsService::new();

        shortlists.expect_submit().never();

        let res = as_company(TestClient::post("http://example.com/shortlists"))
            .json(&json!({
                "criteria": { "role_title": "Backend Engineer", "seniority": "wizard" },
            }))
            .send(&make_service(shortlists))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_previous_request_returns_400() -> TestResult {
        let mut shortlists = MockShortlistsService::new();

        shortlists
            .expect_submit()
            .once()
            .return_once(|_, _| Err(ShortlistsServiceError::InvalidReference));

        let res = as_company(TestClient::post("http://example.com/shortlists"))
            .json(&json!({
                "criteria": { "role_title": "Backend Engineer" },
                "previous_request": ShortlistRequestUuid::new().into_uuid(),
            }))
            .send(&make_service(shortlists))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
