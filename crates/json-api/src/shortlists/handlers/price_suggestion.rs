//! Price Suggestion Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    shortlists::{errors::into_status_error, models::PriceQuoteResponse},
    state::State,
};

/// Price Suggestion Handler
///
/// Itemised price for the currently approved candidates, with the follow-up discount the company
/// would get.
#[endpoint(
    tags("pricing"),
    summary = "Suggest Price",
    security(("actor" = []))
)]
pub(crate) async fn handler(
    shortlist: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PriceQuoteResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.operator_or_403()?;

    let quote = state
        .app
        .shortlists
        .suggest_price(shortlist.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(quote.into()))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use shortlist::pricing::{PriceInputs, suggest_price};
    use testresult::TestResult;

    use shortlist_app::domain::shortlists::{
        MockShortlistsService, data::PriceQuote, records::ShortlistRequestUuid,
    };

    use crate::test_helpers::{as_operator, shortlists_service};

    use super::*;

    fn make_service(shortlists: MockShortlistsService) -> Service {
        shortlists_service(
            shortlists,
            Router::with_path("shortlists/{shortlist}/price-suggestion").get(handler),
        )
    }

    #[tokio::test]
    async fn test_price_suggestion_is_itemised() -> TestResult {
        let uuid = ShortlistRequestUuid::new();
        let suggestion = suggest_price(PriceInputs {
            seniority: None,
            approved_candidates: 5,
            rare_profile: true,
        });
        let quote = PriceQuote {
            approved_candidates: 5,
            suggestion,
            discount_percent: Decimal::new(20, 0),
        };

        let mut shortlists = MockShortlistsService::new();

        shortlists
            .expect_suggest_price()
            .once()
            .withf(move |request| *request == uuid)
            .return_once(move |_| Ok(quote));

        let mut res = as_operator(TestClient::get(format!(
            "http://example.com/shortlists/{uuid}/price-suggestion"
        )))
        .send(&make_service(shortlists))
        .await;

        let body: PriceQuoteResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.price, suggestion.price);
        assert_eq!(body.rarity_premium, suggestion.rarity_premium);
        assert_eq!(body.discount_percent, "20");

        Ok(())
    }
}
