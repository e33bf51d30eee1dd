//! Shortlist Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;
use shortlist::{
    follow_up::{PricingCategory, RequestSignature},
    lifecycle::{ShortlistOutcome, ShortlistStatus},
    matching::HiringCriteria,
};
use uuid::Uuid;

use crate::{
    domain::{candidates::CandidateUuid, payments::records::PaymentUuid},
    uuids::TypedUuid,
};

/// Marker for company identifiers. Companies live in the account system.
#[derive(Debug)]
pub struct Company;

/// Marker for operator identifiers.
#[derive(Debug)]
pub struct Operator;

/// Company UUID
pub type CompanyUuid = TypedUuid<Company>;

/// Operator UUID
pub type OperatorUuid = TypedUuid<Operator>;

/// Shortlist Request UUID
pub type ShortlistRequestUuid = TypedUuid<ShortlistRequestRecord>;

/// Shortlist Candidate UUID
pub type ShortlistCandidateUuid = TypedUuid<ShortlistCandidateRecord>;

/// Shortlist Event UUID
pub type ShortlistEventUuid = TypedUuid<ShortlistEventRecord>;

/// Shortlist Request Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistRequestRecord {
    pub uuid: ShortlistRequestUuid,
    pub company: CompanyUuid,
    pub criteria: HiringCriteria,
    pub rare_profile: bool,
    pub status: ShortlistStatus,
    pub outcome: ShortlistOutcome,
    pub outcome_reason: Option<String>,
    pub currency: String,
    pub proposed_price: Option<u64>,
    pub approved_price: Option<u64>,
    pub proposed_candidate_count: Option<u32>,
    pub payment: Option<PaymentUuid>,
    pub pricing_category: PricingCategory,
    pub follow_up_discount_percent: Decimal,
    pub previous_request: Option<ShortlistRequestUuid>,
    pub requested_candidate_count: Option<u32>,
    pub delivered_candidate_count: Option<u32>,

    /// Price override recorded at delivery.
    pub final_price: Option<u64>,
    pub delivered_at: Option<Timestamp>,
    pub payment_confirmed_by: Option<OperatorUuid>,
    pub payment_confirmed_at: Option<Timestamp>,
    pub cancellation_reason: Option<String>,
    pub pricing_decline_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub archived_at: Option<Timestamp>,
}

impl ShortlistRequestRecord {
    /// Fields compared when looking for follow-ups.
    pub fn signature(&self) -> RequestSignature {
        RequestSignature::from(&self.criteria)
    }
}

/// Shortlist Candidate Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistCandidateRecord {
    pub uuid: ShortlistCandidateUuid,
    pub request: ShortlistRequestUuid,
    pub candidate: CandidateUuid,
    pub pass_number: u32,
    pub score: f64,
    pub reason: String,
    pub rank: Option<u32>,
    pub approved: bool,
    pub is_new: bool,
    pub previous_request: Option<ShortlistRequestUuid>,
    pub reinclusion_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Shortlist Event Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistEventRecord {
    pub uuid: ShortlistEventUuid,
    pub request: ShortlistRequestUuid,
    pub event_type: String,
    pub previous_status: Option<ShortlistStatus>,
    pub new_status: Option<ShortlistStatus>,
    pub actor: Option<Uuid>,
    pub actor_type: String,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}
