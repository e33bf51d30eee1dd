//! Shortlist
//!
//! Core domain logic for the curated shortlist marketplace: candidate matching, the shortlist
//! lifecycle and outcome state machines, follow-up detection, pricing and payment settlement
//! planning. Everything in this crate is pure; persistence and provider I/O live in the
//! application crate.

pub mod follow_up;
pub mod lifecycle;
pub mod matching;
pub mod parse;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod seniority;
pub mod transitions;
