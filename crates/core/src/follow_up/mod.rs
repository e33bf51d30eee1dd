//! Follow-up requests
//!
//! A company's new request can continue an earlier one. Follow-ups are priced with a discount
//! that shrinks as the earlier request ages, and candidates already shown to the company are
//! kept out of the new shortlist.

mod detector;
mod rules;
mod similarity;

pub use detector::{
    FollowUpDetector, FollowUpMatch, LinkedPrior, PriorRequest, PricingCategory, PricingDecision,
    days_between,
};
pub use rules::{DiscountSchedule, FollowUpPricingRule};
pub use similarity::{RequestSignature, similarity};
