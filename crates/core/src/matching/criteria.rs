//! Hiring criteria

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::seniority::Seniority;

/// Where the hire will work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringLocation {
    /// Country name or ISO code.
    pub country: Option<String>,

    /// City name.
    pub city: Option<String>,

    /// IANA zone name or a fixed offset such as `UTC+2`.
    pub timezone: Option<String>,

    /// Whether the role can be done remotely.
    pub remote: bool,
}

/// What a company is hiring for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringCriteria {
    /// Requested role title, e.g. "Senior Go Engineer".
    pub role_title: String,

    /// Required skills.
    pub tech_stack: Vec<String>,

    /// Requested seniority, if any.
    pub seniority: Option<Seniority>,

    /// Work location.
    pub location: HiringLocation,
}

/// Invalid hiring criteria.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    /// The role title is blank.
    #[error("role title is required")]
    MissingRoleTitle,

    /// A tech stack entry is blank.
    #[error("tech stack entry {0} is blank")]
    BlankSkill(usize),
}

impl HiringCriteria {
    /// Checks the criteria and returns a normalised copy: trimmed strings and a tech stack
    /// without case-insensitive duplicates (first spelling wins).
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError`] for a blank title or blank skill.
    pub fn validate(self) -> Result<Self, CriteriaError> {
        let role_title = self.role_title.trim().to_string();

        if role_title.is_empty() {
            return Err(CriteriaError::MissingRoleTitle);
        }

        let mut tech_stack: Vec<String> = Vec::with_capacity(self.tech_stack.len());

        for (index, skill) in self.tech_stack.into_iter().enumerate() {
            let skill = skill.trim();

            if skill.is_empty() {
                return Err(CriteriaError::BlankSkill(index));
            }

            if !tech_stack.iter().any(|seen| seen.eq_ignore_ascii_case(skill)) {
                tech_stack.push(skill.to_string());
            }
        }

        Ok(Self {
            role_title,
            tech_stack,
            seniority: self.seniority,
            location: HiringLocation {
                country: trimmed(self.location.country),
                city: trimmed(self.location.city),
                timezone: trimmed(self.location.timezone),
                remote: self.location.remote,
            },
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
