//! Request similarity

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    matching::{HiringCriteria, scoring::jaccard},
    seniority::Seniority,
};

/// The parts of a request that decide whether it continues an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSignature {
    /// Requested role title.
    pub role_title: String,

    /// Requested seniority.
    pub seniority: Option<Seniority>,

    /// Remote role.
    pub remote: bool,

    /// Hiring country.
    pub country: Option<String>,

    /// Required skills.
    pub tech_stack: Vec<String>,
}

impl From<&HiringCriteria> for RequestSignature {
    fn from(criteria: &HiringCriteria) -> Self {
        Self {
            role_title: criteria.role_title.clone(),
            seniority: criteria.seniority,
            remote: criteria.location.remote,
            country: criteria.location.country.clone(),
            tech_stack: criteria.tech_stack.clone(),
        }
    }
}

/// Similarity between two requests, from 0 to 100.
///
/// | signal | points |
/// |---|---|
/// | equal titles (containment) | 30 (15) |
/// | equal seniority (both unspecified) | 20 (10) |
/// | equal remote flag | 10 |
/// | equal country | 10 |
/// | tech stack Jaccard | up to 30 |
pub fn similarity(new: &RequestSignature, prior: &RequestSignature) -> f64 {
    title_points(&new.role_title, &prior.role_title)
        + seniority_points(new.seniority, prior.seniority)
        + if new.remote == prior.remote { 10.0 } else { 0.0 }
        + country_points(new.country.as_deref(), prior.country.as_deref())
        + stack_points(&new.tech_stack, &prior.tech_stack)
}

fn title_points(new: &str, prior: &str) -> f64 {
    let new = new.trim().to_lowercase();
    let prior = prior.trim().to_lowercase();

    if new.is_empty() || prior.is_empty() {
        0.0
    } else if new == prior {
        30.0
    } else if new.contains(&prior) || prior.contains(&new) {
        15.0
    } else {
        0.0
    }
}

fn seniority_points(new: Option<Seniority>, prior: Option<Seniority>) -> f64 {
    match (new, prior) {
        (Some(new), Some(prior)) if new == prior => 20.0,
        (None, None) => 10.0,
        _ => 0.0,
    }
}

fn country_points(new: Option<&str>, prior: Option<&str>) -> f64 {
    let same = match (new, prior) {
        (Some(new), Some(prior)) => new.trim().eq_ignore_ascii_case(prior.trim()),
        (None, None) => true,
        _ => false,
    };

    if same { 10.0 } else { 0.0 }
}

fn stack_points(new: &[String], prior: &[String]) -> f64 {
    let normalise = |stack: &[String]| -> FxHashSet<String> {
        stack
            .iter()
            .map(|skill| skill.trim().to_lowercase())
            .filter(|skill| !skill.is_empty())
            .collect()
    };

    let new = normalise(new);
    let prior = normalise(prior);

    if new.is_empty() && prior.is_empty() {
        return 30.0;
    }

    30.0 * jaccard(&new, &prior)
}
