//! Payments
//!
//! Provider-agnostic payment state: the status machine for authorization holds and the planning
//! of how a hold is finalized once the shortlist outcome is known.

mod settlement;
mod status;

pub use settlement::{
    PartialTerms, Settlement, SettlementError, apply_discount, partial_amount, plan,
};
pub use status::PaymentStatus;
