//! Shortlist Domain Concerns

pub mod candidates;
pub mod follow_ups;
pub mod notifications;
pub mod payments;
pub mod shortlists;
