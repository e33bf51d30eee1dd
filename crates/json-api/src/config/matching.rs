//! Matching Config

use clap::Args;
use shortlist::{follow_up::FollowUpDetector, matching::MatchingConfig};

/// Matching engine and follow-up detection tunables.
#[derive(Debug, Args)]
pub struct MatchingSettings {
    /// Candidates returned by a matching pass when the request does not limit them
    #[arg(long = "matching-max-results", env = "MATCHING_MAX_RESULTS", default_value_t = 15)]
    pub max_results: usize,

    /// Score bonus on follow-ups for candidates active since the previous request
    #[arg(
        long = "matching-freshness-boost",
        env = "MATCHING_FRESHNESS_BOOST",
        default_value_t = 0.0
    )]
    pub freshness_boost: f64,

    /// Only requests created within this many days can be followed up
    #[arg(long = "follow-up-lookback-days", env = "FOLLOW_UP_LOOKBACK_DAYS", default_value_t = 30)]
    pub lookback_days: u32,

    /// Minimum similarity (0 to 100) for a follow-up
    #[arg(
        long = "follow-up-similarity-threshold",
        env = "FOLLOW_UP_SIMILARITY_THRESHOLD",
        default_value_t = 70.0
    )]
    pub similarity_threshold: f64,
}

impl MatchingSettings {
    pub(crate) fn matching(&self) -> MatchingConfig {
        MatchingConfig {
            default_max_results: self.max_results,
            follow_up_freshness_boost: self.freshness_boost,
            ..MatchingConfig::default()
        }
    }

    pub(crate) fn follow_up(&self) -> FollowUpDetector {
        FollowUpDetector {
            lookback_days: self.lookback_days,
            threshold: self.similarity_threshold,
        }
    }
}
