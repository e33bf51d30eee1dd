//! Match reasons
//!
//! A short sentence shown to operators next to each ranked candidate. Presentation only.

use crate::{
    matching::{
        candidate::{Availability, CandidateProfile},
        criteria::HiringCriteria,
        scoring::ScoreBreakdown,
    },
    seniority::Seniority,
};

/// Builds the reason text for a scored candidate.
pub fn describe(
    criteria: &HiringCriteria,
    candidate: &CandidateProfile,
    breakdown: &ScoreBreakdown,
) -> String {
    let mut parts = Vec::with_capacity(5);

    if criteria.tech_stack.is_empty() {
        parts.push("no required skills".to_string());
    } else if breakdown.matched_skills.is_empty() {
        parts.push("none of the required skills".to_string());
    } else {
        parts.push(format!(
            "matches {} ({}/{} skills)",
            breakdown.matched_skills.join(", "),
            breakdown.matched_skills.len(),
            criteria.tech_stack.len()
        ));
    }

    parts.push(seniority_phrase(criteria.seniority, candidate.seniority));

    parts.push(
        match candidate.availability {
            Availability::ActivelyOpen => "actively looking",
            Availability::Passive => "open to offers",
            Availability::NotNow => "not looking right now",
        }
        .to_string(),
    );

    match candidate.recommendation_count {
        0 => {}
        1 => parts.push("1 recommendation".to_string()),
        count => parts.push(format!("{count} recommendations")),
    }

    if let Some(location) = location_phrase(breakdown) {
        parts.push(location.to_string());
    }

    let mut reason = parts.join("; ");

    if let Some(first) = reason.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    reason
}

fn seniority_phrase(requested: Option<Seniority>, candidate: Option<Seniority>) -> String {
    match (requested, candidate) {
        (Some(requested), Some(candidate)) if requested == candidate => {
            format!("{candidate} as requested")
        }
        (Some(requested), Some(candidate)) => format!("{candidate} (requested {requested})"),
        (None, Some(candidate)) => candidate.to_string(),
        (_, None) => "seniority unknown".to_string(),
    }
}

fn location_phrase(breakdown: &ScoreBreakdown) -> Option<&'static str> {
    let signals = breakdown.location_signals;

    if signals.same_city {
        Some("based in the same city")
    } else if signals.remote_fit {
        Some("works remotely")
    } else if signals.same_country {
        Some("based in the same country")
    } else if signals.willing_to_relocate {
        Some("willing to relocate")
    } else if signals.close_timezone {
        Some("in a nearby timezone")
    } else {
        None
    }
}
