//! Shortlist prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    follow_up::{
        DiscountSchedule, FollowUpDetector, FollowUpMatch, FollowUpPricingRule, LinkedPrior,
        PricingCategory, PricingDecision, PriorRequest, RequestSignature,
    },
    lifecycle::{OutcomeDecision, OutcomeError, ShortlistOutcome, ShortlistStatus, closing_status},
    matching::{
        Availability, CandidateLocation, CandidateMatch, CandidateProfile, CandidateSkill,
        CriteriaError, HiringCriteria, HiringLocation, MatchOptions, MatchingConfig,
        MatchingEngine, ScoreBreakdown, WorkPreference,
    },
    parse::UnknownVariant,
    payments::{PartialTerms, PaymentStatus, Settlement, SettlementError},
    pricing::{PriceInputs, PriceSuggestion, suggest_price},
    seniority::Seniority,
    transitions::{TransitionError, TransitionGraph},
};
