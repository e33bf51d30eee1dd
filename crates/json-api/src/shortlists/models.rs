//! Shortlist Models

use std::string::ToString;

use rust_decimal::Decimal;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use shortlist::{
    lifecycle::ShortlistOutcome,
    matching::{HiringCriteria, HiringLocation},
    payments::PartialTerms,
    seniority::Seniority,
};
use uuid::Uuid;

use shortlist_app::domain::shortlists::{
    data::{
        CandidateUpdate, Delivery, NewShortlistRequest, OutcomeInput, PriceQuote,
        ProcessedShortlist, ProposedScope, Reinclusion, SettlementResolution,
    },
    records::{ShortlistCandidateRecord, ShortlistEventRecord, ShortlistRequestRecord},
};

use crate::extensions::*;

/// Work location of the hire.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct LocationBody {
    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    /// IANA zone name or a fixed offset such as `UTC+2`
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub remote: bool,
}

/// Hiring criteria
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CriteriaBody {
    pub role_title: String,

    #[serde(default)]
    pub tech_stack: Vec<String>,

    /// One of `junior`, `mid`, `senior`, `lead`, `principal`
    #[serde(default)]
    pub seniority: Option<String>,

    #[serde(default)]
    pub location: LocationBody,
}

impl TryFrom<CriteriaBody> for HiringCriteria {
    type Error = StatusError;

    fn try_from(body: CriteriaBody) -> Result<Self, Self::Error> {
        let seniority = body
            .seniority
            .as_deref()
            .map(str::parse::<Seniority>)
            .transpose()
            .or_400("invalid seniority")?;

        Ok(HiringCriteria {
            role_title: body.role_title,
            tech_stack: body.tech_stack,
            seniority,
            location: HiringLocation {
                country: body.location.country,
                city: body.location.city,
                timezone: body.location.timezone,
                remote: body.location.remote,
            },
        })
    }
}

impl From<HiringCriteria> for CriteriaBody {
    fn from(criteria: HiringCriteria) -> Self {
        CriteriaBody {
            role_title: criteria.role_title,
            tech_stack: criteria.tech_stack,
            seniority: criteria.seniority.map(|seniority| seniority.as_str().to_string()),
            location: LocationBody {
                country: criteria.location.country,
                city: criteria.location.city,
                timezone: criteria.location.timezone,
                remote: criteria.location.remote,
            },
        }
    }
}

/// Submit Shortlist Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubmitShortlistRequest {
    pub criteria: CriteriaBody,

    #[serde(default)]
    pub rare_profile: bool,

    /// ISO 4217 code, `USD` when omitted
    #[serde(default)]
    pub currency: Option<String>,

    /// Earlier request this one continues
    #[serde(default)]
    pub previous_request: Option<Uuid>,
}

impl TryFrom<SubmitShortlistRequest> for NewShortlistRequest {
    type Error = StatusError;

    fn try_from(request: SubmitShortlistRequest) -> Result<Self, Self::Error> {
        Ok(NewShortlistRequest {
            criteria: HiringCriteria::try_from(request.criteria)?,
            rare_profile: request.rare_profile,
            currency: request.currency,
            previous_request: request.previous_request.map(Into::into),
        })
    }
}

/// A free-text reason
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReasonRequest {
    pub reason: String,
}

/// A free-text note
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct NoteRequest {
    pub note: String,
}

/// Candidate Update Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CandidateUpdateRequest {
    #[serde(default)]
    pub approved: Option<bool>,

    /// 1-based position among approved candidates
    #[serde(default)]
    pub rank: Option<u32>,
}

impl From<CandidateUpdateRequest> for CandidateUpdate {
    fn from(request: CandidateUpdateRequest) -> Self {
        CandidateUpdate {
            approved: request.approved,
            rank: request.rank,
        }
    }
}

/// Reinclusion Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReinclusionRequest {
    /// Candidate recommended on an earlier request of the chain
    pub candidate: Uuid,
    pub reason: String,
}

impl From<ReinclusionRequest> for Reinclusion {
    fn from(request: ReinclusionRequest) -> Self {
        Reinclusion {
            candidate: request.candidate.into(),
            reason: request.reason,
        }
    }
}

/// Proposed Scope Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProposeScopeRequest {
    /// Price in minor units
    pub price: u64,
    pub candidate_count: u32,
}

impl From<ProposeScopeRequest> for ProposedScope {
    fn from(request: ProposeScopeRequest) -> Self {
        ProposedScope {
            price: request.price,
            candidate_count: request.candidate_count,
        }
    }
}

/// Delivery Request
///
/// Candidate counts are taken from the proposal and the approved candidates.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeliveryRequest {
    /// Final price in minor units, at most the authorized amount
    #[serde(default)]
    pub price_override: Option<u64>,
}

impl From<DeliveryRequest> for Delivery {
    fn from(request: DeliveryRequest) -> Self {
        Delivery {
            price_override: request.price_override,
        }
    }
}

/// Outcome Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OutcomeRequest {
    /// One of `delivered`, `partial`, `no_match`, `cancelled`
    pub outcome: String,
    pub reason: String,

    /// Percentage taken off the authorized amount on a partial outcome
    #[serde(default)]
    pub partial_discount_percent: Option<String>,

    /// Exact amount captured on a partial outcome
    #[serde(default)]
    pub partial_override_amount: Option<u64>,
}

impl TryFrom<OutcomeRequest> for OutcomeInput {
    type Error = StatusError;

    fn try_from(request: OutcomeRequest) -> Result<Self, Self::Error> {
        let outcome = request
            .outcome
            .parse::<ShortlistOutcome>()
            .or_400("invalid outcome")?;

        let partial = partial_terms(
            request.partial_discount_percent.as_deref(),
            request.partial_override_amount,
        )?;

        Ok(OutcomeInput {
            outcome,
            reason: request.reason,
            partial,
        })
    }
}

fn partial_terms(
    discount_percent: Option<&str>,
    override_amount: Option<u64>,
) -> Result<Option<PartialTerms>, StatusError> {
    let discount_percent = discount_percent
        .map(str::parse::<Decimal>)
        .transpose()
        .or_400("invalid partial discount")?;

    Ok(
        (discount_percent.is_some() || override_amount.is_some()).then_some(PartialTerms {
            discount_percent,
            override_amount,
        }),
    )
}

/// Settlement Resolution Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SettlementResolutionRequest {
    /// How the funds were settled outside the platform
    pub note: String,

    /// Percentage taken off the authorized amount when retrying a partial capture
    #[serde(default)]
    pub partial_discount_percent: Option<String>,

    /// Exact amount captured when retrying a partial capture
    #[serde(default)]
    pub partial_override_amount: Option<u64>,
}

impl TryFrom<SettlementResolutionRequest> for SettlementResolution {
    type Error = StatusError;

    fn try_from(request: SettlementResolutionRequest) -> Result<Self, Self::Error> {
        let partial = partial_terms(
            request.partial_discount_percent.as_deref(),
            request.partial_override_amount,
        )?;

        Ok(SettlementResolution {
            note: request.note,
            partial,
        })
    }
}

/// Shortlist Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShortlistResponse {
    pub uuid: Uuid,
    pub company: Uuid,
    pub criteria: CriteriaBody,
    pub rare_profile: bool,

    /// Workflow status
    pub status: String,

    /// Business outcome, `pending` until decided
    pub outcome: String,
    pub outcome_reason: Option<String>,
    pub currency: String,
    pub proposed_price: Option<u64>,
    pub approved_price: Option<u64>,
    pub proposed_candidate_count: Option<u32>,
    pub payment: Option<Uuid>,

    /// `new`, `follow_up` or `free_regen`
    pub pricing_category: String,
    pub follow_up_discount_percent: String,
    pub previous_request: Option<Uuid>,
    pub requested_candidate_count: Option<u32>,
    pub delivered_candidate_count: Option<u32>,
    pub final_price: Option<u64>,
    pub delivered_at: Option<String>,
    pub payment_confirmed_by: Option<Uuid>,
    pub payment_confirmed_at: Option<String>,
    pub cancellation_reason: Option<String>,
    pub pricing_decline_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub archived_at: Option<String>,
}

impl From<ShortlistRequestRecord> for ShortlistResponse {
    fn from(request: ShortlistRequestRecord) -> Self {
        ShortlistResponse {
            uuid: request.uuid.into(),
            company: request.company.into(),
            criteria: request.criteria.into(),
            rare_profile: request.rare_profile,
            status: request.status.to_string(),
            outcome: request.outcome.to_string(),
            outcome_reason: request.outcome_reason,
            currency: request.currency,
            proposed_price: request.proposed_price,
            approved_price: request.approved_price,
            proposed_candidate_count: request.proposed_candidate_count,
            payment: request.payment.map(Into::into),
            pricing_category: request.pricing_category.to_string(),
            follow_up_discount_percent: request.follow_up_discount_percent.to_string(),
            previous_request: request.previous_request.map(Into::into),
            requested_candidate_count: request.requested_candidate_count,
            delivered_candidate_count: request.delivered_candidate_count,
            final_price: request.final_price,
            delivered_at: request.delivered_at.as_ref().map(ToString::to_string),
            payment_confirmed_by: request.payment_confirmed_by.map(Into::into),
            payment_confirmed_at: request.payment_confirmed_at.as_ref().map(ToString::to_string),
            cancellation_reason: request.cancellation_reason,
            pricing_decline_reason: request.pricing_decline_reason,
            created_at: request.created_at.to_string(),
            updated_at: request.updated_at.to_string(),
            archived_at: request.archived_at.as_ref().map(ToString::to_string),
        }
    }
}

/// Shortlist Candidate Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CandidateResponse {
    pub uuid: Uuid,
    pub candidate: Uuid,
    pub pass_number: u32,
    pub score: f64,
    pub reason: String,
    pub rank: Option<u32>,
    pub approved: bool,

    /// Not recommended on any earlier request of the chain
    pub is_new: bool,
    pub previous_request: Option<Uuid>,
    pub reinclusion_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ShortlistCandidateRecord> for CandidateResponse {
    fn from(candidate: ShortlistCandidateRecord) -> Self {
        CandidateResponse {
            uuid: candidate.uuid.into(),
            candidate: candidate.candidate.into(),
            pass_number: candidate.pass_number,
            score: candidate.score,
            reason: candidate.reason,
            rank: candidate.rank,
            approved: candidate.approved,
            is_new: candidate.is_new,
            previous_request: candidate.previous_request.map(Into::into),
            reinclusion_reason: candidate.reinclusion_reason,
            created_at: candidate.created_at.to_string(),
            updated_at: candidate.updated_at.to_string(),
        }
    }
}

/// Matching Pass Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProcessedResponse {
    pub request: ShortlistResponse,
    pub pass_number: u32,
    pub candidates: Vec<CandidateResponse>,
}

impl From<ProcessedShortlist> for ProcessedResponse {
    fn from(processed: ProcessedShortlist) -> Self {
        ProcessedResponse {
            request: processed.request.into(),
            pass_number: processed.pass_number,
            candidates: processed.candidates.into_iter().map(Into::into).collect(),
        }
    }
}

/// Price Suggestion Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PriceQuoteResponse {
    pub approved_candidates: u32,
    pub base: u64,
    pub size_adjustment: i64,
    pub rarity_premium: u64,
    pub minimum: u64,
    pub floor_applied: bool,

    /// Suggested price before any follow-up discount
    pub price: u64,

    /// Follow-up discount applied when the company approves
    pub discount_percent: String,
}

impl From<PriceQuote> for PriceQuoteResponse {
    fn from(quote: PriceQuote) -> Self {
        PriceQuoteResponse {
            approved_candidates: quote.approved_candidates,
            base: quote.suggestion.base,
            size_adjustment: quote.suggestion.size_adjustment,
            rarity_premium: quote.suggestion.rarity_premium,
            minimum: quote.suggestion.minimum,
            floor_applied: quote.suggestion.floor_applied,
            price: quote.suggestion.price,
            discount_percent: quote.discount_percent.to_string(),
        }
    }
}

/// Shortlist Event Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct EventResponse {
    pub uuid: Uuid,
    pub event_type: String,
    pub previous_status: Option<String>,
    pub new_status: Option<String>,
    pub actor: Option<Uuid>,
    pub actor_type: String,

    #[salvo(schema(value_type = Object))]
    pub metadata: serde_json::Value,
    pub created_at: String,
}

impl From<ShortlistEventRecord> for EventResponse {
    fn from(event: ShortlistEventRecord) -> Self {
        EventResponse {
            uuid: event.uuid.into(),
            event_type: event.event_type,
            previous_status: event.previous_status.as_ref().map(ToString::to_string),
            new_status: event.new_status.as_ref().map(ToString::to_string),
            actor: event.actor,
            actor_type: event.actor_type,
            metadata: event.metadata,
            created_at: event.created_at.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn outcome_request(outcome: &str) -> OutcomeRequest {
        OutcomeRequest {
            outcome: outcome.to_string(),
            reason: "agreed with the client".to_string(),
            partial_discount_percent: None,
            partial_override_amount: None,
        }
    }

    #[test]
    fn outcome_without_terms_has_no_partial() -> TestResult {
        let input = OutcomeInput::try_from(outcome_request("delivered"))?;

        assert_eq!(input.outcome, ShortlistOutcome::Delivered);
        assert_eq!(input.partial, None);

        Ok(())
    }

    #[test]
    fn partial_terms_are_parsed() -> TestResult {
        let request = OutcomeRequest {
            partial_discount_percent: Some("25.5".to_string()),
            ..outcome_request("partial")
        };

        let input = OutcomeInput::try_from(request)?;

        assert_eq!(
            input.partial,
            Some(PartialTerms {
                discount_percent: Some(Decimal::new(255, 1)),
                override_amount: None,
            })
        );

        Ok(())
    }

    #[test]
    fn unknown_outcomes_are_rejected() {
        let error = OutcomeInput::try_from(outcome_request("maybe")).err();

        assert_eq!(
            error.map(|error| error.code),
            Some(salvo::http::StatusCode::BAD_REQUEST)
        );
    }

    #[test]
    fn unknown_seniority_is_rejected() {
        let body = CriteriaBody {
            role_title: "Backend Engineer".to_string(),
            tech_stack: vec!["Rust".to_string()],
            seniority: Some("wizard".to_string()),
            location: LocationBody::default(),
        };

        assert!(HiringCriteria::try_from(body).is_err());
    }
}
