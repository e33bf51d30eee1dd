//! Candidate scoring
//!
//! Each component returns points already weighted into the 0 to 100 scale. [`score_candidate`]
//! sums them into a [`ScoreBreakdown`].

use jiff::{Timestamp, tz::TimeZone};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    matching::{
        candidate::{Availability, CandidateLocation, CandidateProfile, CandidateSkill},
        criteria::{HiringCriteria, HiringLocation},
    },
    seniority::Seniority,
};

/// Points for skill coverage.
pub const SKILL_WEIGHT: f64 = 45.0;

/// Points for seniority closeness.
pub const SENIORITY_WEIGHT: f64 = 15.0;

/// Points for role title similarity.
pub const ROLE_WEIGHT: f64 = 10.0;

/// Points for recent activity.
pub const ACTIVITY_WEIGHT: f64 = 10.0;

/// Points for availability.
pub const AVAILABILITY_WEIGHT: f64 = 5.0;

/// Points for recommendations.
pub const RECOMMENDATION_WEIGHT: f64 = 5.0;

/// Points for location fit.
pub const LOCATION_WEIGHT: f64 = 5.0;

/// Raw location points are out of this many.
pub const LOCATION_RAW_MAX: f64 = 85.0;

/// Offsets at most this far apart (in seconds) count as the same working hours.
pub const CLOSE_TIMEZONE_SECONDS: i32 = 2 * 60 * 60;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Per-component points for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Skill coverage, out of 45.
    pub skills: f64,

    /// Seniority closeness, out of 15.
    pub seniority: f64,

    /// Role title similarity, out of 10.
    pub role: f64,

    /// Activity recency, out of 10.
    pub activity: f64,

    /// Availability, out of 5.
    pub availability: f64,

    /// Recommendations, out of 5.
    pub recommendations: f64,

    /// Location fit, out of 5.
    pub location: f64,

    /// Follow-up freshness boost.
    pub freshness_boost: f64,

    /// Required skills the candidate covers.
    pub matched_skills: Vec<String>,

    /// Location facts that scored.
    pub location_signals: LocationSignals,
}

impl ScoreBreakdown {
    /// Sum of every component, clamped to 0..=100.
    pub fn total(&self) -> f64 {
        let total = self.skills
            + self.seniority
            + self.role
            + self.activity
            + self.availability
            + self.recommendations
            + self.location
            + self.freshness_boost;

        if total.is_nan() {
            0.0
        } else {
            total.clamp(0.0, 100.0)
        }
    }
}

/// Location facts used for both scoring and the reason text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSignals {
    /// Remote role and the candidate accepts remote work.
    pub remote_fit: bool,

    /// Same country.
    pub same_country: bool,

    /// Same city.
    pub same_city: bool,

    /// Timezones within two hours.
    pub close_timezone: bool,

    /// Candidate would relocate.
    pub willing_to_relocate: bool,
}

impl LocationSignals {
    /// Raw points out of [`LOCATION_RAW_MAX`].
    pub fn raw_points(self) -> f64 {
        [
            (self.remote_fit, 25.0),
            (self.same_country, 15.0),
            (self.same_city, 25.0),
            (self.close_timezone, 10.0),
            (self.willing_to_relocate, 10.0),
        ]
        .into_iter()
        .filter_map(|(hit, points)| hit.then_some(points))
        .sum()
    }
}

/// Scores one candidate against the criteria.
pub fn score_candidate(
    criteria: &HiringCriteria,
    candidate: &CandidateProfile,
    now: Timestamp,
) -> ScoreBreakdown {
    let (skills, matched_skills) = skill_points(&criteria.tech_stack, &candidate.skills);
    let location_signals = location_signals(&criteria.location, &candidate.location, now);

    ScoreBreakdown {
        skills,
        seniority: SENIORITY_WEIGHT * seniority_factor(criteria.seniority, candidate.seniority),
        role: role_points(&criteria.role_title, candidate.desired_role.as_deref()),
        activity: ACTIVITY_WEIGHT * activity_factor(candidate.last_active_at, now),
        availability: AVAILABILITY_WEIGHT * availability_factor(candidate.availability),
        recommendations: RECOMMENDATION_WEIGHT
            * recommendation_factor(candidate.recommendation_count),
        location: LOCATION_WEIGHT * location_signals.raw_points() / LOCATION_RAW_MAX,
        freshness_boost: 0.0,
        matched_skills,
        location_signals,
    }
}

/// Skill points and the required skills that matched.
///
/// A required skill matches when it and a candidate skill name contain one another, ignoring
/// case. Coverage is blended 70/30 with the mean confidence of the matched candidate skills.
pub fn skill_points(required: &[String], skills: &[CandidateSkill]) -> (f64, Vec<String>) {
    if required.is_empty() {
        return (SKILL_WEIGHT / 2.0, Vec::new());
    }

    let candidate_skills: Vec<(String, f64)> = skills
        .iter()
        .map(|skill| (skill.name.trim().to_lowercase(), unit(skill.confidence)))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    let mut matched = Vec::new();
    let mut confidence_sum = 0.0;

    for skill in required {
        let needle = skill.trim().to_lowercase();

        if needle.is_empty() {
            continue;
        }

        let best = candidate_skills
            .iter()
            .filter(|(name, _)| name.contains(&needle) || needle.contains(name.as_str()))
            .map(|(_, confidence)| *confidence)
            .max_by(f64::total_cmp);

        if let Some(confidence) = best {
            matched.push(skill.clone());
            confidence_sum += confidence;
        }
    }

    if matched.is_empty() {
        return (0.0, matched);
    }

    let coverage = ratio(matched.len(), required.len());
    let mean_confidence = confidence_sum / ratio(matched.len(), 1);

    (
        SKILL_WEIGHT * (0.7 * coverage + 0.3 * mean_confidence),
        matched,
    )
}

/// Seniority closeness between 0.2 and 1.
pub fn seniority_factor(requested: Option<Seniority>, candidate: Option<Seniority>) -> f64 {
    match (requested, candidate) {
        (Some(requested), Some(candidate)) => match requested.steps_from(candidate) {
            0 => 1.0,
            1 => 0.7,
            2 => 0.4,
            _ => 0.2,
        },
        _ => 0.5,
    }
}

/// Role similarity points from token Jaccard similarity.
pub fn role_points(role_title: &str, desired_role: Option<&str>) -> f64 {
    let requested = tokens(role_title);
    let desired = desired_role.map(tokens).unwrap_or_default();

    if requested.is_empty() || desired.is_empty() {
        return ROLE_WEIGHT / 2.0;
    }

    ROLE_WEIGHT * jaccard(&requested, &desired)
}

/// Activity recency between 0.1 and 1.
pub fn activity_factor(last_active_at: Option<Timestamp>, now: Timestamp) -> f64 {
    let Some(last_active_at) = last_active_at else {
        return 0.1;
    };

    let days = now.duration_since(last_active_at).as_secs_f64() / SECONDS_PER_DAY;

    match days {
        days if days < 1.0 => 1.0,
        days if days < 7.0 => 0.9,
        days if days < 14.0 => 0.7,
        days if days < 30.0 => 0.5,
        days if days < 60.0 => 0.3,
        _ => 0.1,
    }
}

/// Availability factor.
pub const fn availability_factor(availability: Availability) -> f64 {
    match availability {
        Availability::ActivelyOpen => 1.0,
        Availability::Passive => 0.5,
        Availability::NotNow => 0.2,
    }
}

/// Recommendation factor.
pub const fn recommendation_factor(count: u32) -> f64 {
    match count {
        0 => 0.0,
        1 | 2 => 0.5,
        3 | 4 => 0.8,
        _ => 1.0,
    }
}

/// Location facts for a candidate.
pub fn location_signals(
    wanted: &HiringLocation,
    candidate: &CandidateLocation,
    now: Timestamp,
) -> LocationSignals {
    let close_timezone = match (wanted.timezone.as_deref(), candidate.timezone.as_deref()) {
        (Some(wanted), Some(candidate)) => {
            match (utc_offset_seconds(wanted, now), utc_offset_seconds(candidate, now)) {
                (Some(wanted), Some(candidate)) => {
                    wanted.abs_diff(candidate) <= CLOSE_TIMEZONE_SECONDS.unsigned_abs()
                }
                _ => false,
            }
        }
        _ => false,
    };

    LocationSignals {
        remote_fit: wanted.remote && candidate.work_preference.accepts_remote(),
        same_country: same_place(wanted.country.as_deref(), candidate.country.as_deref()),
        same_city: same_place(wanted.city.as_deref(), candidate.city.as_deref()),
        close_timezone,
        willing_to_relocate: candidate.willing_to_relocate,
    }
}

/// UTC offset in seconds for an IANA zone name or a fixed offset.
///
/// Accepts `UTC`, `GMT`, `UTC+2`, `UTC-05:30`, `+02:00` and any zone known to the tz database.
pub fn utc_offset_seconds(zone: &str, now: Timestamp) -> Option<i32> {
    let zone = zone.trim();
    let upper = zone.to_ascii_uppercase();

    match upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
    {
        Some("") => return Some(0),
        Some(offset) => return fixed_offset_seconds(offset),
        None => {}
    }

    if zone.starts_with(['+', '-']) {
        return fixed_offset_seconds(zone);
    }

    TimeZone::get(zone)
        .ok()
        .map(|tz| tz.to_offset(now).seconds())
}

fn fixed_offset_seconds(offset: &str) -> Option<i32> {
    let (sign, digits) = if let Some(digits) = offset.strip_prefix('+') {
        (1, digits)
    } else if let Some(digits) = offset.strip_prefix('-') {
        (-1, digits)
    } else {
        return None;
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((hours, minutes)) => (hours.parse::<i32>().ok()?, minutes.parse::<i32>().ok()?),
        None => (digits.parse::<i32>().ok()?, 0),
    };

    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    Some(sign * (hours * 3600 + minutes * 60))
}

fn same_place(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => {
            let left = left.trim();

            !left.is_empty() && left.eq_ignore_ascii_case(right.trim())
        }
        _ => false,
    }
}

/// Lower-cased tokens split on whitespace and punctuation.
pub(crate) fn tokens(value: &str) -> FxHashSet<String> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// `|a ∩ b| / |a ∪ b|`, zero when both are empty.
pub(crate) fn jaccard(left: &FxHashSet<String>, right: &FxHashSet<String>) -> f64 {
    let union = left.union(right).count();

    if union == 0 {
        return 0.0;
    }

    ratio(left.intersection(right).count(), union)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "counts are far below f64's exact integer range"
)]
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
