//! Candidate matching
//!
//! Scores a pool of candidates against a company's hiring criteria and returns a ranked list.
//! Scoring is additive: skills (45), seniority (15), role title (10), activity (10),
//! availability (5), recommendations (5) and location (5), plus an optional follow-up freshness
//! boost, clamped to 0..=100.

mod candidate;
mod criteria;
mod engine;
mod reason;
pub mod scoring;

pub use candidate::{
    Availability, CandidateLocation, CandidateProfile, CandidateSkill, WorkPreference,
};
pub use criteria::{CriteriaError, HiringCriteria, HiringLocation};
pub use engine::{CandidateMatch, MatchOptions, MatchingConfig, MatchingEngine};
pub use reason::describe;
pub use scoring::{LocationSignals, ScoreBreakdown, score_candidate};
