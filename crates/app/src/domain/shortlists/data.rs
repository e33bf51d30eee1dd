//! Shortlists Data

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shortlist::{
    lifecycle::ShortlistOutcome,
    matching::HiringCriteria,
    payments::PartialTerms,
    pricing::PriceSuggestion,
};
use uuid::Uuid;

use crate::domain::{
    candidates::CandidateUuid,
    shortlists::records::{
        CompanyUuid, OperatorUuid, ShortlistCandidateRecord, ShortlistRequestRecord,
        ShortlistRequestUuid,
    },
};

/// Currency used when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// New Shortlist Request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewShortlistRequest {
    pub criteria: HiringCriteria,

    #[serde(default)]
    pub rare_profile: bool,

    /// ISO 4217 code; [`DEFAULT_CURRENCY`] when omitted.
    #[serde(default)]
    pub currency: Option<String>,

    /// Explicit link to an earlier request of the same company.
    #[serde(default)]
    pub previous_request: Option<ShortlistRequestUuid>,
}

/// Operator edits to a ranked candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CandidateUpdate {
    pub approved: Option<bool>,
    pub rank: Option<u32>,
}

/// Manual re-inclusion of a previously recommended candidate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reinclusion {
    pub candidate: CandidateUuid,
    pub reason: String,
}

/// Price and size proposed to the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProposedScope {
    pub price: u64,
    pub candidate_count: u32,
}

/// Delivery details recorded by the operator.
///
/// Candidate counts come from the proposal and the approved candidates of the latest pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Delivery {
    /// Final price, at most the authorized amount.
    #[serde(default)]
    pub price_override: Option<u64>,
}

/// Outcome decided by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutcomeInput {
    pub outcome: ShortlistOutcome,
    pub reason: String,

    /// Terms for a partial capture; falls back to the delivery price override.
    #[serde(default)]
    pub partial: Option<PartialTerms>,
}

/// Operator follow-up on a decided outcome whose settlement the provider rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettlementResolution {
    /// How the funds were settled outside the platform, or why the retry is safe.
    pub note: String,

    /// Terms for retrying a partial capture; falls back to the delivery price override.
    #[serde(default)]
    pub partial: Option<PartialTerms>,
}

/// Who performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Operator(OperatorUuid),
    Company(CompanyUuid),
    System,
    Provider,
}

impl Actor {
    /// Stored actor type.
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Operator(_) => "operator",
            Self::Company(_) => "company",
            Self::System => "system",
            Self::Provider => "provider",
        }
    }

    pub fn uuid(self) -> Option<Uuid> {
        match self {
            Self::Operator(uuid) => Some(uuid.into_uuid()),
            Self::Company(uuid) => Some(uuid.into_uuid()),
            Self::System | Self::Provider => None,
        }
    }
}

/// Result of a matching pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedShortlist {
    pub request: ShortlistRequestRecord,
    pub pass_number: u32,
    pub candidates: Vec<ShortlistCandidateRecord>,
}

/// Suggested price for the current curation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub approved_candidates: u32,
    pub suggestion: PriceSuggestion,

    /// Follow-up discount the company will get on approval.
    pub discount_percent: Decimal,
}
