//! Matching engine

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::{
    candidate::CandidateProfile,
    criteria::HiringCriteria,
    reason::describe,
    scoring::{ScoreBreakdown, score_candidate},
};

/// Tunables for the matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Result limit when the caller does not set one.
    pub default_max_results: usize,

    /// Candidates scoring at or below this are dropped.
    pub min_score: f64,

    /// Points added on follow-ups for candidates active since the previous request.
    pub follow_up_freshness_boost: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            default_max_results: 15,
            min_score: 20.0,
            follow_up_freshness_boost: 0.0,
        }
    }
}

/// Per-call matching options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Overrides [`MatchingConfig::default_max_results`].
    pub max_results: Option<usize>,

    /// Candidates that must not be scored at all.
    pub exclude: FxHashSet<Uuid>,

    /// Whether the request is a follow-up.
    pub is_follow_up: bool,

    /// Creation time of the request this one follows up on.
    pub previous_created_at: Option<Timestamp>,
}

/// A ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Candidate identifier.
    pub candidate: Uuid,

    /// Score between 0 and 100, rounded to two decimals.
    pub score: f64,

    /// Human readable explanation.
    pub reason: String,

    /// Whether the candidate is new to the company's request chain.
    pub is_new: bool,

    /// Component scores.
    pub breakdown: ScoreBreakdown,
}

/// Scores and ranks a candidate pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingEngine {
    config: MatchingConfig,
}

impl MatchingEngine {
    /// Create an engine with the given tunables.
    pub const fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// The engine's tunables.
    pub const fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Ranks the eligible, non-excluded candidates in `pool`.
    ///
    /// Results score above [`MatchingConfig::min_score`], are ordered by score (highest first,
    /// then candidate id) and hold at most `max_results` entries.
    pub fn find_matches<'a, I>(
        &self,
        criteria: &HiringCriteria,
        pool: I,
        options: &MatchOptions,
        now: Timestamp,
    ) -> Vec<CandidateMatch>
    where
        I: IntoIterator<Item = &'a CandidateProfile>,
    {
        let max_results = options
            .max_results
            .unwrap_or(self.config.default_max_results);

        let mut matches: Vec<CandidateMatch> = pool
            .into_iter()
            .filter(|candidate| candidate.is_eligible())
            .filter(|candidate| !options.exclude.contains(&candidate.uuid))
            .filter_map(|candidate| {
                let mut breakdown = score_candidate(criteria, candidate, now);
                breakdown.freshness_boost = self.freshness_boost(candidate, options);

                let total = breakdown.total();

                (total > self.config.min_score).then(|| CandidateMatch {
                    candidate: candidate.uuid,
                    score: round_score(total),
                    reason: describe(criteria, candidate, &breakdown),
                    is_new: true,
                    breakdown,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.candidate.cmp(&b.candidate))
        });
        matches.truncate(max_results);

        matches
    }

    /// Scores a single candidate that an operator brought back by hand.
    ///
    /// Eligibility, exclusions and the score threshold do not apply.
    pub fn rescore(
        &self,
        criteria: &HiringCriteria,
        candidate: &CandidateProfile,
        now: Timestamp,
    ) -> CandidateMatch {
        let breakdown = score_candidate(criteria, candidate, now);

        CandidateMatch {
            candidate: candidate.uuid,
            score: round_score(breakdown.total()),
            reason: describe(criteria, candidate, &breakdown),
            is_new: false,
            breakdown,
        }
    }

    fn freshness_boost(&self, candidate: &CandidateProfile, options: &MatchOptions) -> f64 {
        if !options.is_follow_up {
            return 0.0;
        }

        match (candidate.last_active_at, options.previous_created_at) {
            (Some(active), Some(previous)) if active > previous => {
                self.config.follow_up_freshness_boost
            }
            _ => 0.0,
        }
    }
}

fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
