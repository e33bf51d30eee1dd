//! Candidate profiles

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    parse::{UnknownVariant, normalise_key},
    seniority::Seniority,
};

/// How keen a candidate is to move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Looking right now.
    ActivelyOpen,

    /// Would listen to the right offer.
    #[default]
    Passive,

    /// Not looking.
    NotNow,
}

impl Availability {
    /// Canonical storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActivelyOpen => "actively_open",
            Self::Passive => "passive",
            Self::NotNow => "not_now",
        }
    }
}

impl FromStr for Availability {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalise_key(value).as_str() {
            "actively_open" | "active" | "open" => Ok(Self::ActivelyOpen),
            "passive" => Ok(Self::Passive),
            "not_now" | "closed" => Ok(Self::NotNow),
            _ => Err(UnknownVariant::new("availability", value)),
        }
    }
}

/// Where a candidate prefers to work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkPreference {
    /// Remote only.
    Remote,

    /// Remote or on site.
    #[default]
    Flexible,

    /// On site only.
    Onsite,
}

impl WorkPreference {
    /// Whether a remote role suits the candidate.
    pub const fn accepts_remote(self) -> bool {
        matches!(self, Self::Remote | Self::Flexible)
    }

    /// Canonical storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Flexible => "flexible",
            Self::Onsite => "onsite",
        }
    }
}

impl FromStr for WorkPreference {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalise_key(value).as_str() {
            "remote" => Ok(Self::Remote),
            "flexible" | "hybrid" => Ok(Self::Flexible),
            "onsite" | "on_site" | "office" => Ok(Self::Onsite),
            _ => Err(UnknownVariant::new("work preference", value)),
        }
    }
}

/// Structured candidate location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLocation {
    /// Country name or ISO code.
    pub country: Option<String>,

    /// City name.
    pub city: Option<String>,

    /// IANA zone name or a fixed offset.
    pub timezone: Option<String>,

    /// Whether the candidate would move for a role.
    pub willing_to_relocate: bool,

    /// Remote, flexible or on site.
    pub work_preference: WorkPreference,
}

/// A skill extracted from a candidate's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkill {
    /// Skill name as extracted.
    pub name: String,

    /// Extraction confidence between 0 and 1.
    pub confidence: f64,
}

/// A candidate in the matching pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Candidate identifier.
    pub uuid: Uuid,

    /// Role the candidate is looking for.
    pub desired_role: Option<String>,

    /// Candidate seniority, if known.
    pub seniority: Option<Seniority>,

    /// Extracted skills.
    pub skills: Vec<CandidateSkill>,

    /// Number of approved recommendations.
    pub recommendation_count: u32,

    /// Last time the candidate was active.
    pub last_active_at: Option<Timestamp>,

    /// Job search availability.
    pub availability: Availability,

    /// Location preferences.
    pub location: CandidateLocation,

    /// Profile is visible to companies.
    pub visible: bool,

    /// Candidate opted in to opportunities.
    pub open_to_opportunities: bool,
}

impl CandidateProfile {
    /// Whether the candidate may be scored at all.
    pub const fn is_eligible(&self) -> bool {
        self.visible && self.open_to_opportunities
    }
}
